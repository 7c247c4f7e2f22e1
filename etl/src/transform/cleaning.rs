//! Typed coercion and cleaning of raw extracted columns.

use polars::prelude::*;

use crate::error::{TransformError, TransformResult};
use crate::table::Table;

/// Day.month.year, e.g. `02.01.2013`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Smallest float that still fits an `i64` (-2^63, exact).
const I64_FLOOR: f64 = i64::MIN as f64;
/// First float past the `i64` range (2^63).
const I64_CEILING: f64 = -(i64::MIN as f64);

fn invalid(table: &Table, row: usize, column: &str, value: &str, expected: &'static str) -> TransformError {
    TransformError::InvalidValue {
        table: table.name().to_string(),
        row,
        column: column.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn float_to_int(v: f64) -> Option<i64> {
    // NaN and infinities have no zero fraction
    (v.fract() == 0.0 && (I64_FLOOR..I64_CEILING).contains(&v)).then_some(v as i64)
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        // ids written as floats, e.g. "5.0"
        .or_else(|| s.parse::<f64>().ok().and_then(float_to_int))
}

/// Values of `column` as text, for cell-by-cell parsing.
fn text_values(table: &Table, column: &str) -> TransformResult<Vec<Option<String>>> {
    let text = table
        .column(column)?
        .cast(&DataType::String)
        .map_err(|e| table.frame_error(e))?;
    let text = text.str().map_err(|e| table.frame_error(e))?;
    Ok(text.into_iter().map(|v| v.map(String::from)).collect())
}

fn replace(table: &Table, column: Column) -> TransformResult<Table> {
    Ok(table.with_column(column)?)
}

/// Coerce a column to `Int64`. Nulls stay null; integral floats such as
/// `"6.0"` are accepted, values outside the `i64` range are not.
pub fn coerce_int(table: &Table, column: &str) -> TransformResult<Table> {
    let source = table.column(column)?;
    if source.dtype().is_integer() {
        let typed = source
            .cast(&DataType::Int64)
            .map_err(|e| table.frame_error(e))?;
        return replace(table, typed);
    }

    if source.dtype().is_float() {
        let floats = source
            .cast(&DataType::Float64)
            .map_err(|e| table.frame_error(e))?;
        let values = floats
            .f64()
            .map_err(|e| table.frame_error(e))?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(v) => float_to_int(v)
                    .map(Some)
                    .ok_or_else(|| invalid(table, row, column, &v.to_string(), "an integer")),
            })
            .collect::<TransformResult<Vec<Option<i64>>>>()?;
        return replace(table, Column::new(column.into(), values));
    }

    let values = text_values(table, column)?
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(text) => parse_int(text)
                .map(Some)
                .ok_or_else(|| invalid(table, row, column, text, "an integer")),
        })
        .collect::<TransformResult<Vec<Option<i64>>>>()?;

    replace(table, Column::new(column.into(), values))
}

/// Coerce a column to `Float64`. Nulls stay null.
pub fn coerce_float(table: &Table, column: &str) -> TransformResult<Table> {
    let source = table.column(column)?;
    if source.dtype().is_float() || source.dtype().is_integer() {
        let typed = source
            .cast(&DataType::Float64)
            .map_err(|e| table.frame_error(e))?;
        return replace(table, typed);
    }

    let values = text_values(table, column)?
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(text) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| invalid(table, row, column, text, "a number")),
        })
        .collect::<TransformResult<Vec<Option<f64>>>>()?;

    replace(table, Column::new(column.into(), values))
}

/// Replace nulls in numeric `column` with the mean of its present values.
///
/// A column without nulls is returned unchanged. A column with nulls but
/// no present value fails with [`TransformError::UndefinedMean`].
pub fn impute_mean(table: &Table, column: &str) -> TransformResult<Table> {
    let source = table.column(column)?;
    let missing = source.null_count();
    if missing == 0 {
        return Ok(table.clone());
    }
    if missing == source.len() {
        return Err(TransformError::UndefinedMean {
            table: table.name().to_string(),
            column: column.to_string(),
        });
    }

    let plan = table
        .lazy()
        .with_column(col(column).fill_null(col(column).mean()).alias(column));
    Ok(table.collect(plan)?)
}

/// Parse every value of text `column` with `format`. The first
/// non-conforming value, including a missing one, aborts the whole table.
pub fn parse_dates(table: &Table, column: &str, format: &str) -> TransformResult<Table> {
    if table.column(column)?.dtype() == &DataType::Date {
        return Ok(table.clone());
    }

    let raw = text_values(table, column)?;
    let options = StrptimeOptions {
        format: Some(format.into()),
        strict: false,
        ..Default::default()
    };
    let parsed = table.collect(
        table
            .lazy()
            .with_column(col(column).str().to_date(options).alias(column)),
    )?;

    let failures = parsed.column(column)?.as_materialized_series().is_null();
    if let Some(row) = failures.into_iter().position(|failed| failed == Some(true)) {
        return Err(TransformError::InvalidDate {
            table: table.name().to_string(),
            row,
            value: raw[row].clone().unwrap_or_default(),
            format: format.to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;
    use chrono::NaiveDate;

    fn table(name: &str, column: Column) -> Table {
        Table::new(name, DataFrame::new(vec![column]).unwrap())
    }

    fn prices(values: Vec<Option<f64>>) -> Table {
        table("daily_sales", Column::new("item_price".into(), values))
    }

    fn floats(table: &Table, name: &str) -> Vec<Option<f64>> {
        table.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    fn ints(table: &Table, name: &str) -> Vec<Option<i64>> {
        table.column(name).unwrap().i64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_coerce_int_accepts_float_text() {
        let raw = table(
            "items",
            Column::new("item_category_id".into(), vec![Some("5"), Some("6.0"), None]),
        );
        let typed = coerce_int(&raw, "item_category_id").unwrap();
        assert_eq!(ints(&typed, "item_category_id"), vec![Some(5), Some(6), None]);
    }

    #[test]
    fn test_coerce_int_rejects_garbage() {
        let raw = table("items", Column::new("item_id".into(), vec!["ten"]));
        let err = coerce_int(&raw, "item_id").unwrap_err();
        match err {
            TransformError::InvalidValue { row, column, value, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "item_id");
                assert_eq!(value, "ten");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_coerce_int_rejects_out_of_range_floats() {
        let raw = table("items", Column::new("item_id".into(), vec!["7", "1e19"]));
        let err = coerce_int(&raw, "item_id").unwrap_err();
        assert!(matches!(err, TransformError::InvalidValue { row: 1, .. }));

        let floats = table("items", Column::new("item_id".into(), vec![3.0, 9.3e18]));
        let err = coerce_int(&floats, "item_id").unwrap_err();
        assert!(matches!(err, TransformError::InvalidValue { row: 1, .. }));

        assert_eq!(float_to_int(-9.223_372_036_854_775_808e18), Some(i64::MIN));
        assert_eq!(float_to_int(f64::NAN), None);
        assert_eq!(float_to_int(f64::INFINITY), None);
    }

    #[test]
    fn test_coerce_int_widens_integers() {
        let raw = table("items", Column::new("item_id".into(), vec![1i32, 2]));
        let typed = coerce_int(&raw, "item_id").unwrap();
        assert_eq!(typed.column("item_id").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_coerce_float_missing_column() {
        let raw = prices(vec![]);
        let err = coerce_float(&raw, "item_cnt_day").unwrap_err();
        assert!(matches!(err, TransformError::Table(TableError::Schema(_))));
    }

    #[test]
    fn test_coerce_float_parses_text() {
        let raw = table("daily_sales", Column::new("item_cnt_day".into(), vec![Some(" 2"), None, Some("-1.5")]));
        let typed = coerce_float(&raw, "item_cnt_day").unwrap();
        assert_eq!(floats(&typed, "item_cnt_day"), vec![Some(2.0), None, Some(-1.5)]);
    }

    #[test]
    fn test_impute_mean_fills_nulls() {
        let raw = prices(vec![None, Some(100.0), Some(200.0)]);
        let imputed = impute_mean(&raw, "item_price").unwrap();
        assert_eq!(
            floats(&imputed, "item_price"),
            vec![Some(150.0), Some(100.0), Some(200.0)]
        );
    }

    #[test]
    fn test_impute_mean_is_idempotent() {
        let raw = prices(vec![None, Some(10.0), Some(11.0)]);
        let once = impute_mean(&raw, "item_price").unwrap();
        let twice = impute_mean(&once, "item_price").unwrap();
        assert!(once.frame().equals_missing(twice.frame()));
    }

    #[test]
    fn test_impute_mean_without_nulls_is_noop() {
        let raw = prices(vec![Some(1.0), Some(2.0)]);
        let imputed = impute_mean(&raw, "item_price").unwrap();
        assert!(imputed.frame().equals_missing(raw.frame()));
    }

    #[test]
    fn test_impute_mean_all_missing_fails() {
        let raw = prices(vec![None, None]);
        let err = impute_mean(&raw, "item_price").unwrap_err();
        assert!(matches!(err, TransformError::UndefinedMean { .. }));
    }

    #[test]
    fn test_impute_mean_empty_column_is_noop() {
        let raw = prices(vec![]);
        assert_eq!(impute_mean(&raw, "item_price").unwrap().row_count(), 0);
    }

    #[test]
    fn test_parse_dates_strict() {
        let raw = table("daily_sales", Column::new("date".into(), vec!["02.01.2013", "2013-01-03"]));
        let err = parse_dates(&raw, "date", DATE_FORMAT).unwrap_err();
        match err {
            TransformError::InvalidDate { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "2013-01-03");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_dates_day_first() {
        let raw = table("daily_sales", Column::new("date".into(), vec!["02.01.2013"]));
        let parsed = parse_dates(&raw, "date", DATE_FORMAT).unwrap();
        let dates: Vec<Option<NaiveDate>> = parsed
            .column("date")
            .unwrap()
            .date()
            .unwrap()
            .as_date_iter()
            .collect();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2013, 1, 2)]);
    }

    #[test]
    fn test_parse_dates_rejects_missing() {
        let raw = table("daily_sales", Column::new("date".into(), vec![Some("02.01.2013"), None]));
        assert!(matches!(
            parse_dates(&raw, "date", DATE_FORMAT),
            Err(TransformError::InvalidDate { row: 1, .. })
        ));
    }
}
