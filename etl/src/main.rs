//! Sales ETL CLI - clean, enrich and pivot daily retail sales
//!
//! # Commands
//!
//! ```bash
//! sales-etl                         # Full pipeline with default paths
//! sales-etl run --data-dir data     # Full pipeline
//! sales-etl transform               # Only write final_data.csv
//! sales-etl inspect items.csv       # Show headers and row count
//! ```

use clap::{Args, Parser, Subcommand};
use sales_etl::config::{outputs, DEFAULT_DATA_DIR, DEFAULT_OUTPUT_DIR};
use sales_etl::logs::{log_info, LOG_BROADCASTER};
use sales_etl::{inspect, run_pipeline, transform, write_frame, PipelineConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sales-etl")]
#[command(about = "Batch ETL over daily retail sales with pivot summaries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct PathArgs {
    /// Directory holding daily_sales.csv, items.csv, item_categories.csv,
    /// interested_sales_trends.csv and shops.csv
    #[arg(long, env = "SALES_ETL_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Directory receiving the output files
    #[arg(long, env = "SALES_ETL_OUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    out_dir: PathBuf,

    /// Emit progress as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl PathArgs {
    fn config(&self) -> PipelineConfig {
        PipelineConfig::new(&self.data_dir, self.out_dir.clone())
    }
}

impl Default for PathArgs {
    fn default() -> Self {
        Self {
            data_dir: std::env::var_os("SALES_ETL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            out_dir: std::env::var_os("SALES_ETL_OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            json_logs: false,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: transform, write final data and all five pivots
    Run {
        #[command(flatten)]
        paths: PathArgs,

        /// Also write a JSON run summary
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Transform only and write final_data.csv
    Transform {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Show headers and row count of a CSV file
    Inspect {
        /// Input CSV file
        input: PathBuf,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        None => cmd_run(&PathArgs::default(), None),
        Some(Commands::Run { paths, summary }) => cmd_run(&paths, summary.as_deref()),
        Some(Commands::Transform { paths }) => cmd_transform(&paths),
        Some(Commands::Inspect { input }) => cmd_inspect(&input),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(paths: &PathArgs, summary_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    LOG_BROADCASTER.set_json(paths.json_logs);
    let config = paths.config();
    log_info(format!("📂 Data: {}", paths.data_dir.display()));

    let summary = run_pipeline(&config)?;

    if let Some(path) = summary_path {
        summary.write_json(path)?;
        log_info(format!("Summary written to: {}", path.display()));
    }

    log_info(format!(
        "✨ Done! {} sales rows, {} rows of interest, {} files written",
        summary.sales_rows,
        summary.final_rows,
        summary.outputs.len()
    ));
    Ok(())
}

fn cmd_transform(paths: &PathArgs) -> Result<(), Box<dyn std::error::Error>> {
    LOG_BROADCASTER.set_json(paths.json_logs);
    let config = paths.config();

    let output = transform(&config.inputs)?;
    let path = config.output_path(outputs::FINAL_DATA);
    let rows = write_frame(&output.final_data, &path)?;

    log_info(format!("💾 {} ({} rows)", path.display(), rows));
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", input.display());

    let info = inspect(input)?;
    eprintln!("   Columns: {}", info.headers.join(", "));
    eprintln!("✅ {} rows", info.row_count);

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
