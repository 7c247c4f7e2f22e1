//! The five summary pivots produced by a pipeline run.

use crate::error::AggregateResult;
use crate::logs::{log_success, log_warning};
use crate::table::Table;

use super::pivot::{pivot_table, Aggregation, PivotSpec, PivotTable};

/// Pivots built from the enriched daily sales table.
#[derive(Debug, Clone)]
pub struct DailySalesPivots {
    /// Units sold per (shop, item) and (month, year).
    pub sales_pivot: PivotTable,
    /// Mean price per item category.
    pub price_pivot: PivotTable,
    /// Revenue per shop and `date_block_num`.
    pub shop_sales_pivot: PivotTable,
}

/// Pivots built from the filtered final table.
#[derive(Debug, Clone)]
pub struct FinalDataPivots {
    /// Revenue per category and (month, year).
    pub category_sales_pivot: PivotTable,
    /// Units sold per (item, category) and month.
    pub top_items_pivot: PivotTable,
}

pub fn sales_pivot_spec() -> PivotSpec {
    PivotSpec::new(&["shop_id", "item_id"], &["month", "year"], "item_cnt_day", Aggregation::Sum)
}

pub fn price_pivot_spec() -> PivotSpec {
    PivotSpec::new(&["item_category_id"], &[], "item_price", Aggregation::Mean)
}

pub fn shop_sales_pivot_spec() -> PivotSpec {
    PivotSpec::new(&["shop_id"], &["date_block_num"], "total_revenue", Aggregation::Sum)
}

pub fn category_sales_pivot_spec() -> PivotSpec {
    PivotSpec::new(&["item_category_id"], &["month", "year"], "total_revenue", Aggregation::Sum)
}

pub fn top_items_pivot_spec() -> PivotSpec {
    PivotSpec::new(&["item_id", "item_category_id"], &["month"], "item_cnt_day", Aggregation::Sum)
}

fn build(table: &Table, spec: PivotSpec, name: &str) -> AggregateResult<PivotTable> {
    let pivot = pivot_table(table, &spec)?.renamed(name);
    if pivot.dropped_rows() > 0 {
        log_warning(format!(
            "{}: {} rows without a {} key left out",
            name,
            pivot.dropped_rows(),
            spec.index.iter().chain(&spec.columns).cloned().collect::<Vec<_>>().join("/")
        ));
    }
    log_success(format!(
        "{}: {} rows × {} columns",
        name,
        pivot.row_keys().len(),
        pivot.column_keys().len()
    ));
    Ok(pivot)
}

/// Units, prices and shop revenue over the daily sales table.
///
/// Requires `shop_id`, `item_id`, `month`, `year`, `item_cnt_day`,
/// `item_category_id`, `item_price`, `date_block_num` and `total_revenue`.
pub fn create_daily_sales_pivots(sales: &Table) -> AggregateResult<DailySalesPivots> {
    Ok(DailySalesPivots {
        sales_pivot: build(sales, sales_pivot_spec(), "sales_pivot")?,
        price_pivot: build(sales, price_pivot_spec(), "price_pivot")?,
        shop_sales_pivot: build(sales, shop_sales_pivot_spec(), "shop_sales_pivot")?,
    })
}

/// Category revenue and item units over the filtered table.
pub fn create_final_data_pivots(final_data: &Table) -> AggregateResult<FinalDataPivots> {
    Ok(FinalDataPivots {
        category_sales_pivot: build(final_data, category_sales_pivot_spec(), "category_sales_pivot")?,
        top_items_pivot: build(final_data, top_items_pivot_spec(), "top_items_pivot")?,
    })
}
