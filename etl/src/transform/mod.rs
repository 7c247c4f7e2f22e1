//! Transformation module.
//!
//! This module turns raw extracted tables into the final merged table:
//! - Cleaning: typed coercion, mean imputation, strict date parsing
//! - Features: revenue, calendar fields, month blocks
//! - Pipeline: the ordered transform including joins and the interest filter

pub mod cleaning;
pub mod features;
pub mod pipeline;

pub use cleaning::{coerce_float, coerce_int, impute_mean, parse_dates, DATE_FORMAT};
pub use features::{add_date_block_num, add_month_year, add_total_revenue};
pub use pipeline::{clean_daily_sales, transform, transform_tables, RawTables, TransformOutput};
