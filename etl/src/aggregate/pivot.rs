//! Generic pivot table construction.
//!
//! A [`PivotSpec`] names the row grouping columns (`index`), the optional
//! column grouping columns (`columns`), the aggregated column (`values`),
//! the aggregation and the fill value.
//!
//! ```text
//! shop_id item_id month year item_cnt_day         month      1     2
//!    1      10      1   2015      3.0      →      year    2015  2015
//!    1      10      2   2015      2.0             shop_id,item_id
//!    2      11      1   2015      1.0             1,10      3.0   2.0
//!                                                 2,11      1.0   0.0
//! ```
//!
//! Keys sort ascending and only observed keys appear. Rows with a null key
//! are left out. Null values are skipped by the aggregation. Any
//! (row, column) cell without a contributing value holds the fill value.

use polars::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AggregateError, AggregateResult};
use crate::table::Table;

/// Grouping key: one integer per grouping column.
pub type Key = Vec<i64>;

/// How values inside one cell are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Mean,
}

impl Aggregation {
    fn apply(self, values: Expr) -> Expr {
        match self {
            Aggregation::Sum => values.sum(),
            Aggregation::Mean => values.mean(),
        }
    }
}

/// Shape of a pivot table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotSpec {
    pub index: Vec<String>,
    pub columns: Vec<String>,
    pub values: String,
    pub aggregation: Aggregation,
    pub fill_value: f64,
}

impl PivotSpec {
    /// Spec with a fill value of 0.
    pub fn new(index: &[&str], columns: &[&str], values: &str, aggregation: Aggregation) -> Self {
        Self {
            index: index.iter().map(|s| s.to_string()).collect(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
            values: values.to_string(),
            aggregation,
            fill_value: 0.0,
        }
    }

    /// Index columns followed by column grouping columns.
    fn keys(&self) -> Vec<&str> {
        self.index.iter().chain(&self.columns).map(String::as_str).collect()
    }
}

/// A pivoted, fully filled summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    name: String,
    spec: PivotSpec,
    row_keys: Vec<Key>,
    column_keys: Vec<Key>,
    cells: Vec<Vec<f64>>,
    dropped_rows: usize,
}

impl PivotTable {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same pivot under a different name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn spec(&self) -> &PivotSpec {
        &self.spec
    }

    /// Sorted row keys.
    pub fn row_keys(&self) -> &[Key] {
        &self.row_keys
    }

    /// Sorted column keys. A pivot without column grouping has exactly one
    /// empty key.
    pub fn column_keys(&self) -> &[Key] {
        &self.column_keys
    }

    /// Row-major values, aligned with `row_keys` × `column_keys`.
    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }

    /// Source rows left out because a grouping key was null.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Value at `(row, column)`, if both keys exist.
    pub fn get(&self, row: &[i64], column: &[i64]) -> Option<f64> {
        let r = self.row_keys.binary_search_by(|k| k.as_slice().cmp(row)).ok()?;
        let c = self.column_keys.binary_search_by(|k| k.as_slice().cmp(column)).ok()?;
        Some(self.cells[r][c])
    }

    /// Sum across one row.
    pub fn row_total(&self, row: &[i64]) -> Option<f64> {
        let r = self.row_keys.binary_search_by(|k| k.as_slice().cmp(row)).ok()?;
        Some(self.cells[r].iter().sum())
    }
}

fn check_types(table: &Table, spec: &PivotSpec) -> AggregateResult<()> {
    for name in spec.keys() {
        let dtype = table.column(name)?.dtype();
        if !dtype.is_integer() {
            return Err(AggregateError::NonIntegerKey {
                table: table.name().to_string(),
                column: name.to_string(),
                dtype: dtype.to_string(),
            });
        }
    }

    let dtype = table.column(&spec.values)?.dtype();
    if !(dtype.is_integer() || dtype.is_float()) {
        return Err(AggregateError::NonNumeric {
            table: table.name().to_string(),
            column: spec.values.clone(),
            dtype: dtype.to_string(),
        });
    }
    Ok(())
}

fn key_values(groups: &Table, name: &str) -> AggregateResult<Vec<Option<i64>>> {
    let column = groups.column(name)?;
    let values = column.i64().map_err(|e| groups.frame_error(e))?;
    Ok(values.into_iter().collect())
}

/// Pivot `table` according to `spec`.
///
/// Grouping and aggregation run as a polars `group_by`; the grouped rows
/// are then spread over the sorted column keys.
pub fn pivot_table(table: &Table, spec: &PivotSpec) -> AggregateResult<PivotTable> {
    let keys = spec.keys();
    table.require(&keys)?;
    table.require(&[spec.values.as_str()])?;
    check_types(table, spec)?;

    let complete = keys
        .iter()
        .fold(lit(true), |acc, name| acc.and(col(*name).is_not_null()));
    let kept = table.collect(table.lazy().filter(complete))?;
    let dropped_rows = table.row_count() - kept.row_count();

    let by: Vec<Expr> = keys
        .iter()
        .map(|name| col(*name).cast(DataType::Int64))
        .collect();
    let value = spec
        .aggregation
        .apply(col(spec.values.as_str()).cast(DataType::Float64));
    let groups = kept.collect(kept.lazy().group_by(by).agg([value]))?;

    let key_columns = keys
        .iter()
        .map(|name| key_values(&groups, name))
        .collect::<AggregateResult<Vec<_>>>()?;
    let aggregated: Vec<Option<f64>> = groups
        .column(&spec.values)?
        .f64()
        .map_err(|e| groups.frame_error(e))?
        .into_iter()
        .collect();

    let split = spec.index.len();
    let mut cells_by_row: BTreeMap<Key, BTreeMap<Key, f64>> = BTreeMap::new();
    let mut column_keys: BTreeSet<Key> = BTreeSet::new();
    for (group, value) in aggregated.into_iter().enumerate() {
        // null keys were filtered out above
        let key: Key = key_columns.iter().filter_map(|c| c[group]).collect();
        let (row_key, column_key) = key.split_at(split);

        column_keys.insert(column_key.to_vec());
        let row = cells_by_row.entry(row_key.to_vec()).or_default();
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            row.insert(column_key.to_vec(), v);
        }
    }

    if spec.columns.is_empty() {
        column_keys.insert(Vec::new());
    }
    let column_keys: Vec<Key> = column_keys.into_iter().collect();

    let mut row_keys = Vec::with_capacity(cells_by_row.len());
    let mut cells = Vec::with_capacity(cells_by_row.len());
    for (row_key, by_column) in cells_by_row {
        let row = column_keys
            .iter()
            .map(|ck| by_column.get(ck).copied().unwrap_or(spec.fill_value))
            .collect();
        row_keys.push(row_key);
        cells.push(row);
    }

    Ok(PivotTable {
        name: format!("{}_by_{}", spec.values, spec.index.join("_")),
        spec: spec.clone(),
        row_keys,
        column_keys,
        cells,
        dropped_rows,
    })
}
