//! Extractor: CSV files into in-memory tables.
//!
//! Column names and row order are preserved exactly. Every column lands as
//! a nullable string column; typing happens later, explicitly, in the
//! transform stage.
//!
//! Parsing is strict: a row with a different field count than the header
//! is an error rather than being padded with nulls.

use polars::prelude::{Column, DataFrame};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{ExtractError, ExtractResult};
use crate::table::Table;

/// Field values read as missing.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Header and size information about an input file.
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Load a comma-separated file with a header row.
///
/// The table is named after the file stem (`items.csv` → `items`).
pub fn read_table<P: AsRef<Path>>(path: P) -> ExtractResult<Table> {
    let path = path.as_ref();
    let file = open(path)?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table");
    parse_named(file, name, &path.display().to_string())
}

/// Parse CSV from a reader into a table called `name`.
pub fn parse_table<R: Read>(reader: R, name: &str) -> ExtractResult<Table> {
    parse_named(reader, name, name)
}

/// Headers and record count of a file. Records are validated but no table
/// is built.
pub fn inspect<P: AsRef<Path>>(path: P) -> ExtractResult<TableInfo> {
    let path = path.as_ref();
    let source_name = path.display().to_string();
    let mut csv_reader = reader(open(path)?);

    let headers = read_headers(&mut csv_reader, &source_name)?;
    let mut row_count = 0;
    for record in csv_reader.records() {
        record.map_err(|e| parse_error(&source_name, e))?;
        row_count += 1;
    }

    Ok(TableInfo {
        path: path.to_path_buf(),
        headers,
        row_count,
    })
}

fn open(path: &Path) -> ExtractResult<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExtractError::MissingFile(path.to_path_buf()),
        _ => ExtractError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(input)
}

fn read_headers<R: Read>(csv_reader: &mut csv::Reader<R>, source_name: &str) -> ExtractResult<Vec<String>> {
    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| parse_error(source_name, e))?
        .iter()
        .map(String::from)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ExtractError::NoHeaders(source_name.to_string()));
    }
    Ok(headers)
}

fn parse_named<R: Read>(input: R, name: &str, source_name: &str) -> ExtractResult<Table> {
    let mut csv_reader = reader(input);
    let headers = read_headers(&mut csv_reader, source_name)?;

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in csv_reader.records() {
        let record = record.map_err(|e| parse_error(source_name, e))?;
        for (column, field) in values.iter_mut().zip(record.iter()) {
            column.push(raw_value(field));
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(header, values)| Column::new(header.into(), values))
        .collect();

    // duplicate header names are rejected here
    let frame = DataFrame::new(columns).map_err(|source| ExtractError::Frame {
        source_name: source_name.to_string(),
        source,
    })?;
    Ok(Table::new(name, frame))
}

fn raw_value(field: &str) -> Option<String> {
    if MISSING_MARKERS.contains(&field.trim()) {
        None
    } else {
        Some(field.to_string())
    }
}

fn parse_error(source_name: &str, err: csv::Error) -> ExtractError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
            format!("expected {} fields, found {}", expected_len, len)
        }
        csv::ErrorKind::Utf8 { .. } => "invalid UTF-8".to_string(),
        _ => err.to_string(),
    };
    ExtractError::Parse {
        source_name: source_name.to_string(),
        line,
        message,
    }
}
