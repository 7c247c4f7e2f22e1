//! Run configuration.
//!
//! Paths are fixed once at startup and handed to each stage by reference;
//! nothing mutates them afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory holding the input CSV files.
pub const DEFAULT_DATA_DIR: &str = "sales_trend_data";

/// Default directory receiving the output CSV files.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

pub const DAILY_SALES_FILE: &str = "daily_sales.csv";
pub const INTERESTED_SALES_TRENDS_FILE: &str = "interested_sales_trends.csv";
pub const ITEM_CATEGORIES_FILE: &str = "item_categories.csv";
pub const ITEMS_FILE: &str = "items.csv";
pub const SHOPS_FILE: &str = "shops.csv";

/// Locations of the five input tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub daily_sales: PathBuf,
    pub interested_sales_trends: PathBuf,
    pub item_categories: PathBuf,
    pub items: PathBuf,
    /// Reserved. Accepted for compatibility with existing dataset layouts
    /// but never read by any stage.
    pub shops: PathBuf,
}

impl DatasetPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            daily_sales: dir.join(DAILY_SALES_FILE),
            interested_sales_trends: dir.join(INTERESTED_SALES_TRENDS_FILE),
            item_categories: dir.join(ITEM_CATEGORIES_FILE),
            items: dir.join(ITEMS_FILE),
            shops: dir.join(SHOPS_FILE),
        }
    }
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}

/// Output file names, one per written table.
pub mod outputs {
    pub const FINAL_DATA: &str = "final_data.csv";
    pub const SALES_PIVOT: &str = "sales_pivot.csv";
    pub const PRICE_PIVOT: &str = "price_pivot.csv";
    pub const SHOP_SALES_PIVOT: &str = "shop_sales_pivot.csv";
    pub const CATEGORY_SALES_PIVOT: &str = "category_sales_pivot.csv";
    pub const TOP_ITEMS_PIVOT: &str = "top_items_pivot.csv";
}

/// Everything a pipeline run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub inputs: DatasetPaths,
    pub output_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(data_dir: impl AsRef<Path>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            inputs: DatasetPaths::in_dir(data_dir),
            output_dir: output_dir.into(),
        }
    }

    /// Full path for an output file name.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR)
    }
}
