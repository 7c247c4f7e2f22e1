//! Transformer: raw input tables to the final merged table.
//!
//! Steps run in a fixed order because later steps read columns derived by
//! earlier ones:
//!
//! 1. Extract daily sales, items, categories and the interest filter
//! 2. Impute missing `item_price` with the column mean
//! 3. Parse `date` as day.month.year
//! 4. Derive `total_revenue`, `month`, `year` and, unless the input has
//!    it, `date_block_num`
//! 5. Drop `item_name` and `item_category_name`
//! 6. Left-join items on `item_id`
//! 7. Left-join categories on `item_category_id`
//! 8. Keep rows whose (`shop_id`, `item_id`) appears in the interest filter
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_etl::{transform, DatasetPaths};
//!
//! let output = transform(&DatasetPaths::in_dir("sales_trend_data"))?;
//! println!("{} rows of interest", output.final_data.row_count());
//! ```

use crate::config::DatasetPaths;
use crate::error::{ExtractResult, PipelineResult, TransformResult};
use crate::extract::read_table;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::table::{left_join, semi_join, Table};

use super::cleaning::{coerce_float, coerce_int, impute_mean, parse_dates, DATE_FORMAT};
use super::features::{add_date_block_num, add_month_year, add_total_revenue};

/// The four tables the transform reads, exactly as extracted.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub daily_sales: Table,
    pub items: Table,
    pub item_categories: Table,
    pub interested_sales_trends: Table,
}

impl RawTables {
    /// Read every input the transform needs. The shops file is not touched.
    pub fn extract(paths: &DatasetPaths) -> ExtractResult<Self> {
        log_info("📖 Reading input files...");
        let daily_sales = read_logged(&paths.daily_sales)?;
        let items = read_logged(&paths.items)?;
        let item_categories = read_logged(&paths.item_categories)?;
        let interested_sales_trends = read_logged(&paths.interested_sales_trends)?;

        Ok(Self {
            daily_sales,
            items,
            item_categories,
            interested_sales_trends,
        })
    }
}

fn read_logged(path: &std::path::Path) -> ExtractResult<Table> {
    let table = read_table(path)?;
    log_success(format!(
        "{}: {} rows, {} columns",
        path.display(),
        table.row_count(),
        table.column_names().len()
    ));
    Ok(table)
}

/// Result of the transform stage.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Every cleaned daily sales row with item and category attached.
    pub sales: Table,
    /// `sales` restricted to the shop/item pairs of interest.
    pub final_data: Table,
}

/// Extract the inputs under `paths` and transform them.
pub fn transform(paths: &DatasetPaths) -> PipelineResult<TransformOutput> {
    let raw = RawTables::extract(paths)?;
    Ok(transform_tables(&raw)?)
}

/// Clean, enrich, join and filter already-extracted tables.
pub fn transform_tables(raw: &RawTables) -> TransformResult<TransformOutput> {
    log_info("🧹 Cleaning daily sales...");
    let daily_sales = clean_daily_sales(&raw.daily_sales)?;

    log_info("🧮 Deriving features...");
    let daily_sales = add_total_revenue(&daily_sales)?;
    let daily_sales = add_month_year(&daily_sales)?;
    if raw.daily_sales.has_column("date_block_num") {
        log_info_indent("total_revenue, month, year (date_block_num from input)", 1);
    } else {
        log_info_indent("total_revenue, month, year, date_block_num", 1);
    }
    let daily_sales = add_date_block_num(&daily_sales)?;

    let items = prepare_items(&raw.items)?;
    let item_categories = prepare_categories(&raw.item_categories)?;

    log_info("🔗 Joining metadata...");
    let sales = left_join(&daily_sales, &items, &["item_id"])?;
    let sales = left_join(&sales, &item_categories, &["item_category_id"])?;
    let unmatched = sales.column("item_category_id")?.null_count();
    if unmatched > 0 {
        log_warning(format!("{} sales rows have no item metadata", unmatched));
    }

    let filter = prepare_filter(&raw.interested_sales_trends)?;
    let final_data = semi_join(&sales, &filter, &["shop_id", "item_id"])?;
    log_success(format!(
        "{} of {} rows match the interest filter",
        final_data.row_count(),
        sales.row_count()
    ));

    Ok(TransformOutput {
        sales: sales.renamed("sales"),
        final_data: final_data.renamed("final_data"),
    })
}

/// Type the raw transaction columns, impute prices and parse dates.
pub fn clean_daily_sales(raw: &Table) -> TransformResult<Table> {
    raw.require(&["date", "shop_id", "item_id", "item_price", "item_cnt_day"])?;

    let table = coerce_int(raw, "shop_id")?;
    let table = coerce_int(&table, "item_id")?;
    let table = coerce_float(&table, "item_price")?;
    let table = coerce_float(&table, "item_cnt_day")?;

    let missing = table.column("item_price")?.null_count();
    let table = impute_mean(&table, "item_price")?;
    if missing > 0 {
        log_info_indent(format!("Imputed {} missing item_price values with the mean", missing), 1);
    }

    parse_dates(&table, "date", DATE_FORMAT)
}

fn prepare_items(raw: &Table) -> TransformResult<Table> {
    let table = coerce_int(raw, "item_id")?;
    let table = coerce_int(&table, "item_category_id")?;
    Ok(table.without_column("item_name")?)
}

fn prepare_categories(raw: &Table) -> TransformResult<Table> {
    let table = coerce_int(raw, "item_category_id")?;
    Ok(table.without_column("item_category_name")?)
}

fn prepare_filter(raw: &Table) -> TransformResult<Table> {
    let table = coerce_int(raw, "shop_id")?;
    coerce_int(&table, "item_id")
}
