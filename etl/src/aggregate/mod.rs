//! Aggregator module.
//!
//! - Pivot: generic grouping, aggregation and fill
//! - Reports: the five fixed summary shapes

pub mod pivot;
pub mod reports;

pub use pivot::{pivot_table, Aggregation, Key, PivotSpec, PivotTable};
pub use reports::{create_daily_sales_pivots, create_final_data_pivots, DailySalesPivots, FinalDataPivots};
