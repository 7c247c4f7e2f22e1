//! # Sales ETL - daily retail sales to pivot summaries
//!
//! One batch pass over a small retail dataset: read the flat input files,
//! clean and enrich the transactions, join item and category metadata,
//! keep the shop/item pairs of interest and write pivot summaries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV inputs │────▶│   Extract   │────▶│  Transform  │────▶│    Load     │
//! │  (5 files)  │     │  (raw text) │     │ (clean/join)│     │ (CSV files) │
//! └─────────────┘     └─────────────┘     └──────┬──────┘     └─────────────┘
//!                                                │                   ▲
//!                                                ▼                   │
//!                                         ┌─────────────┐            │
//!                                         │  Aggregate  │────────────┘
//!                                         │  (pivots)   │
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sales_etl::{run_pipeline, PipelineConfig};
//!
//! fn main() {
//!     let summary = run_pipeline(&PipelineConfig::default()).unwrap();
//!     println!("{} rows of interest", summary.final_rows);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Per-stage error types
//! - [`config`] - Input and output locations
//! - [`logs`] - Progress logging
//! - [`table`] - Named dataframes and joins
//! - [`extract`] - CSV reading
//! - [`transform`] - Cleaning, features, joins, filter
//! - [`aggregate`] - Pivot tables
//! - [`load`] - CSV writing
//! - [`pipeline`] - End-to-end run

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod table;

// Stages
pub mod aggregate;
pub mod extract;
pub mod load;
pub mod transform;

// Orchestration
pub mod pipeline;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    AggregateError,
    ExtractError,
    LoadError,
    PipelineError,
    SchemaError,
    TableError,
    TransformError,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{DatasetPaths, PipelineConfig};

// =============================================================================
// Re-exports - Tables
// =============================================================================

pub use table::{left_join, semi_join, Table};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use extract::{inspect, parse_table, read_table, TableInfo};

pub use transform::{transform, transform_tables, RawTables, TransformOutput};

pub use aggregate::{
    create_daily_sales_pivots,
    create_final_data_pivots,
    pivot_table,
    Aggregation,
    DailySalesPivots,
    FinalDataPivots,
    PivotSpec,
    PivotTable,
};

pub use load::{render_csv, write_frame, CsvFrame};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{run_pipeline, RunSummary, WrittenFile};
