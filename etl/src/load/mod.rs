//! Loader: tables and pivots to CSV files.
//!
//! Plain tables get a leading unnamed row index column. Pivots write their
//! grouping keys as the leading columns, with one header row per column
//! grouping level when there is more than one:
//!
//! ```text
//! ,month,1,2
//! ,year,2015,2015
//! shop_id,item_id,,
//! 1,10,5.0,0.0
//! ```
//!
//! Writes are not atomic: a failure mid-file leaves a partial file behind.

use chrono::NaiveDate;
use polars::prelude::{AnyValue, PolarsResult};
use std::fs::File;
use std::path::Path;

use crate::aggregate::PivotTable;
use crate::error::{LoadError, LoadResult};
use crate::table::Table;

/// Days from 0001-01-01 (day 1) to the Unix epoch.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Anything that renders as header rows followed by body rows.
pub trait CsvFrame {
    fn header_rows(&self) -> Vec<Vec<String>>;
    fn body_rows(&self) -> PolarsResult<Vec<Vec<String>>>;
}

/// Render a float the way spreadsheet consumers expect: whole numbers keep
/// one decimal (`100.0`), NaN is an empty field.
fn format_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn format_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format_float(*v),
        AnyValue::Float32(v) => format_float(f64::from(*v)),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Date(days) => NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_FROM_CE)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

impl CsvFrame for Table {
    fn header_rows(&self) -> Vec<Vec<String>> {
        let mut header = vec![String::new()];
        header.extend(self.column_names());
        vec![header]
    }

    fn body_rows(&self) -> PolarsResult<Vec<Vec<String>>> {
        let columns = self.frame().get_columns();
        (0..self.row_count())
            .map(|r| {
                let mut row = vec![r.to_string()];
                for column in columns {
                    row.push(format_value(&column.get(r)?));
                }
                Ok(row)
            })
            .collect()
    }
}

impl CsvFrame for PivotTable {
    fn header_rows(&self) -> Vec<Vec<String>> {
        let spec = self.spec();
        let index_names: Vec<String> = spec.index.clone();

        match spec.columns.len() {
            0 => {
                let mut header = index_names;
                header.push(spec.values.clone());
                vec![header]
            }
            1 => {
                let mut header = index_names;
                header.extend(self.column_keys().iter().map(|k| k[0].to_string()));
                vec![header]
            }
            _ => {
                let lead = index_names.len().saturating_sub(1);
                let mut rows: Vec<Vec<String>> = spec
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(level, level_name)| {
                        let mut row = vec![String::new(); lead];
                        row.push(level_name.clone());
                        row.extend(self.column_keys().iter().map(|k| k[level].to_string()));
                        row
                    })
                    .collect();

                let mut names_row = index_names;
                names_row.extend(std::iter::repeat(String::new()).take(self.column_keys().len()));
                rows.push(names_row);
                rows
            }
        }
    }

    fn body_rows(&self) -> PolarsResult<Vec<Vec<String>>> {
        Ok(self
            .row_keys()
            .iter()
            .zip(self.cells())
            .map(|(key, values)| {
                key.iter()
                    .map(|k| k.to_string())
                    .chain(values.iter().map(|v| format_float(*v)))
                    .collect()
            })
            .collect())
    }
}

fn write_rows<W: std::io::Write>(
    header: &[Vec<String>],
    body: &[Vec<String>],
    out: W,
) -> Result<usize, csv::Error> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    for row in header.iter().chain(body) {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(body.len())
}

/// Render a frame to an in-memory CSV string.
pub fn render_csv(frame: &(impl CsvFrame + ?Sized)) -> PolarsResult<String> {
    let body = frame.body_rows()?;
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_rows(&frame.header_rows(), &body, &mut buf);
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a frame to `path`, returning the number of body rows written.
pub fn write_frame(frame: &(impl CsvFrame + ?Sized), path: &Path) -> LoadResult<usize> {
    let body = frame.body_rows().map_err(|source| LoadError::Render {
        path: path.to_path_buf(),
        source,
    })?;

    let wrap = |source: std::io::Error| LoadError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(wrap)?;
    write_rows(&frame.header_rows(), &body, file).map_err(|e| wrap(e.into()))
}
