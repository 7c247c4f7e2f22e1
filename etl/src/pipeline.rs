//! End-to-end pipeline run.
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   final_data.csv
//! │ Extract  │──▶│ Transform │──┬──────────────▶ Load
//! └──────────┘   └───────────┘  │
//!                               ├─ sales ──────▶ Aggregate ─▶ sales / price / shop_sales pivots
//!                               └─ final_data ─▶ Aggregate ─▶ category_sales / top_items pivots
//! ```
//!
//! The first error aborts the run. Files already written stay on disk.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::aggregate::{create_daily_sales_pivots, create_final_data_pivots};
use crate::config::{outputs, PipelineConfig};
use crate::error::{LoadError, PipelineResult};
use crate::load::{write_frame, CsvFrame};
use crate::logs::{log_error, log_info, log_success};
use crate::transform::transform;

/// One output file.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
}

/// What a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Daily sales rows after cleaning and joins.
    pub sales_rows: usize,
    /// Rows matching the interest filter.
    pub final_rows: usize,
    pub outputs: Vec<WrittenFile>,
}

impl RunSummary {
    /// Save the summary as pretty JSON.
    pub fn write_json(&self, path: &Path) -> PipelineResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| LoadError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

fn load(
    config: &PipelineConfig,
    frame: &(impl CsvFrame + ?Sized),
    file_name: &str,
    written: &mut Vec<WrittenFile>,
) -> PipelineResult<()> {
    let path = config.output_path(file_name);
    let rows = write_frame(frame, &path)?;
    log_success(format!("💾 {} ({} rows)", path.display(), rows));
    written.push(WrittenFile { path, rows });
    Ok(())
}

/// Run extract, transform, aggregate and load with `config`.
///
/// A failure is logged as an error entry before it is returned.
pub fn run_pipeline(config: &PipelineConfig) -> PipelineResult<RunSummary> {
    run_stages(config).map_err(|err| {
        log_error(err.to_string());
        err
    })
}

fn run_stages(config: &PipelineConfig) -> PipelineResult<RunSummary> {
    let output = transform(&config.inputs)?;
    let mut written = Vec::new();

    log_info("💾 Writing merged dataset...");
    load(config, &output.final_data, outputs::FINAL_DATA, &mut written)?;

    log_info("📊 Pivoting daily sales...");
    let daily = create_daily_sales_pivots(&output.sales)?;
    load(config, &daily.sales_pivot, outputs::SALES_PIVOT, &mut written)?;
    load(config, &daily.price_pivot, outputs::PRICE_PIVOT, &mut written)?;
    load(config, &daily.shop_sales_pivot, outputs::SHOP_SALES_PIVOT, &mut written)?;

    log_info("📊 Pivoting final data...");
    let detailed = create_final_data_pivots(&output.final_data)?;
    load(config, &detailed.category_sales_pivot, outputs::CATEGORY_SALES_PIVOT, &mut written)?;
    load(config, &detailed.top_items_pivot, outputs::TOP_ITEMS_PIVOT, &mut written)?;

    Ok(RunSummary {
        sales_rows: output.sales.row_count(),
        final_rows: output.final_data.row_count(),
        outputs: written,
    })
}
