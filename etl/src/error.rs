//! Error types for the sales ETL pipeline.
//!
//! One error enum per stage, wrapped by the top-level [`PipelineError`]:
//!
//! - [`ExtractError`] - reading and parsing input files
//! - [`SchemaError`] - a table lacks an expected column
//! - [`TableError`] - a dataframe operation on a named table failed
//! - [`TransformError`] - cleaning, coercion and feature derivation
//! - [`AggregateError`] - pivot construction
//! - [`LoadError`] - writing output files
//!
//! Conversion is automatic via `From`, so `?` works across stage boundaries.
//! No stage recovers from another stage's failure.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

// =============================================================================
// Extract Errors
// =============================================================================

/// Errors while loading an input file into a table.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// The file exists but could not be opened or read.
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Ragged rows, bad quoting or undecodable bytes.
    #[error("Invalid CSV in '{source_name}' (line {line}): {message}")]
    Parse {
        source_name: String,
        line: u64,
        message: String,
    },

    /// The file has no header row.
    #[error("No header row in '{0}'")]
    NoHeaders(String),

    /// Parsed columns could not be assembled into a dataframe.
    #[error("Cannot build table from '{source_name}': {source}")]
    Frame {
        source_name: String,
        #[source]
        source: PolarsError,
    },
}

// =============================================================================
// Schema Errors
// =============================================================================

/// A table does not have the columns an operation expects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Expected column absent.
    #[error("Table '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },
}

// =============================================================================
// Table Errors
// =============================================================================

/// Errors from dataframe operations on a named table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Polars rejected the operation (length mismatch, bad cast, join failure...).
    #[error("Table '{table}': {source}")]
    Frame {
        table: String,
        #[source]
        source: PolarsError,
    },
}

// =============================================================================
// Transform Errors
// =============================================================================

/// Errors while cleaning and enriching tables.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Missing column or failed dataframe operation.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A cell could not be coerced to the column's type.
    #[error("Table '{table}', row {row}, column '{column}' (value '{value}'): expected {expected}")]
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    /// A date cell does not match the expected format.
    #[error("Table '{table}', row {row}: date '{value}' does not match format '{format}'")]
    InvalidDate {
        table: String,
        row: usize,
        value: String,
        format: String,
    },

    /// Mean imputation requested but no value is present.
    #[error("Cannot impute '{column}' in table '{table}': every value is missing")]
    UndefinedMean { table: String, column: String },
}

// =============================================================================
// Aggregate Errors
// =============================================================================

/// Errors while building pivot tables.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Missing grouping or value column, or failed group-by.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A grouping key column is not integer typed.
    #[error("Table '{table}': key column '{column}' has type {dtype}, expected integers")]
    NonIntegerKey {
        table: String,
        column: String,
        dtype: String,
    },

    /// The aggregated column is not numeric.
    #[error("Table '{table}': value column '{column}' has type {dtype}, expected numbers")]
    NonNumeric {
        table: String,
        column: String,
        dtype: String,
    },
}

impl From<SchemaError> for TransformError {
    fn from(err: SchemaError) -> Self {
        TransformError::Table(err.into())
    }
}

impl From<SchemaError> for AggregateError {
    fn from(err: SchemaError) -> Self {
        AggregateError::Table(err.into())
    }
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while writing output files.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Destination could not be created or written.
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cell values could not be read back from the dataframe.
    #[error("Failed to render '{}': {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level error returned by [`crate::pipeline::run_pipeline`].
///
/// The display prefix names the failing stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Extract failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Aggregate failed: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    /// Summary report could not be serialized.
    #[error("Summary serialization failed: {0}")]
    Summary(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for extract operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for table shape checks.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for dataframe operations on tables.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for aggregate operations.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for whole pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;
