//! Named tables shared by every pipeline stage.
//!
//! A [`Table`] is a polars [`DataFrame`] plus the name used in error
//! messages (`daily_sales`, `items`, ...). Operations never mutate: each
//! one returns a new table, so every stage is a pure function of its inputs.
//!
//! ```text
//! Table "daily_sales"
//! ┌────────────┬─────────┬─────────┬────────────┬──────────────┐
//! │ date       │ shop_id │ item_id │ item_price │ item_cnt_day │
//! ├────────────┼─────────┼─────────┼────────────┼──────────────┤
//! │ Date       │ Int64   │ Int64   │ Float64    │ Float64      │
//! └────────────┴─────────┴─────────┴────────────┴──────────────┘
//! ```

pub mod join;

use polars::prelude::*;

use crate::error::{SchemaError, SchemaResult, TableError, TableResult};

pub use join::{left_join, semi_join};

/// A dataframe with a name.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    frame: DataFrame,
}

impl Table {
    pub fn new(name: impl Into<String>, frame: DataFrame) -> Self {
        Self {
            name: name.into(),
            frame,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Same data under a different table name.
    pub fn renamed(&self, name: impl Into<String>) -> Table {
        Table::new(name, self.frame.clone())
    }

    /// Lazy view of the data, for expression pipelines.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    /// Run `plan` and keep the result under this table's name.
    pub fn collect(&self, plan: LazyFrame) -> TableResult<Table> {
        let frame = plan.collect().map_err(|e| self.frame_error(e))?;
        Ok(Table::new(self.name.clone(), frame))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> SchemaResult<&Column> {
        self.frame.column(name).map_err(|_| self.missing(name))
    }

    /// Fail on the first absent column.
    pub fn require(&self, names: &[&str]) -> SchemaResult<()> {
        match names.iter().find(|n| !self.has_column(n)) {
            Some(name) => Err(self.missing(name)),
            None => Ok(()),
        }
    }

    /// Append `column`, or replace the existing column of the same name.
    /// The column must have one value per row.
    pub fn with_column(&self, column: Column) -> TableResult<Table> {
        let mut frame = self.frame.clone();
        frame.with_column(column).map_err(|e| self.frame_error(e))?;
        Ok(Table::new(self.name.clone(), frame))
    }

    /// Remove a column. Removing an absent column is an error.
    pub fn without_column(&self, name: &str) -> TableResult<Table> {
        self.column(name)?;
        let frame = self.frame.drop(name).map_err(|e| self.frame_error(e))?;
        Ok(Table::new(self.name.clone(), frame))
    }

    /// Attach this table's name to a polars failure.
    pub fn frame_error(&self, source: PolarsError) -> TableError {
        TableError::Frame {
            table: self.name.clone(),
            source,
        }
    }

    fn missing(&self, column: &str) -> SchemaError {
        SchemaError::MissingColumn {
            table: self.name.clone(),
            column: column.to_string(),
        }
    }
}
