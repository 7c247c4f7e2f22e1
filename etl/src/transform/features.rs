//! Derived columns on the daily sales table.

use polars::prelude::*;

use crate::error::TransformResult;
use crate::table::Table;

use super::cleaning::coerce_int;

/// `total_revenue = item_price × item_cnt_day`, null when either side is null.
pub fn add_total_revenue(table: &Table) -> TransformResult<Table> {
    table.require(&["item_price", "item_cnt_day"])?;
    let plan = table
        .lazy()
        .with_column((col("item_price") * col("item_cnt_day")).alias("total_revenue"));
    Ok(table.collect(plan)?)
}

/// Calendar `month` (1-12) and `year` taken from the parsed `date` column.
pub fn add_month_year(table: &Table) -> TransformResult<Table> {
    table.require(&["date"])?;
    let plan = table.lazy().with_columns([
        col("date").dt().month().cast(DataType::Int64).alias("month"),
        col("date").dt().year().cast(DataType::Int64).alias("year"),
    ]);
    Ok(table.collect(plan)?)
}

/// Month block index per row.
///
/// A `date_block_num` column already in the table is kept as is, typed as
/// integers. Otherwise it is derived as a 0-based index over the distinct
/// (year, month) pairs present, in chronological order; months absent from
/// the data do not consume an index.
pub fn add_date_block_num(table: &Table) -> TransformResult<Table> {
    if table.has_column("date_block_num") {
        return coerce_int(table, "date_block_num");
    }

    table.require(&["year", "month"])?;
    let period = col("year") * lit(12i64) + col("month");
    let block = period.rank(
        RankOptions {
            method: RankMethod::Dense,
            descending: false,
        },
        None,
    );
    let plan = table
        .lazy()
        .with_column((block.cast(DataType::Int64) - lit(1i64)).alias("date_block_num"));
    Ok(table.collect(plan)?)
}
