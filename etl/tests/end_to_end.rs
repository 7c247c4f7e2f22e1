use sales_etl::logs::{LogLevel, LOG_BROADCASTER};
use sales_etl::{run_pipeline, ExtractError, PipelineConfig, PipelineError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DAILY_SALES: &str = "date,shop_id,item_id,item_price,item_cnt_day\n\
                           01.01.2015,1,10,,3\n\
                           01.01.2015,1,10,100,2\n";
const ITEMS: &str = "item_name,item_id,item_category_id\nWidget,10,5\n";
const CATEGORIES: &str = "item_category_name,item_category_id\nTools,5\n";

fn dataset(filter: &str) -> TempDir {
    LOG_BROADCASTER.set_quiet(true);
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::create_dir(dir.path().join("out")).unwrap();
    fs::write(data.join("daily_sales.csv"), DAILY_SALES).unwrap();
    fs::write(data.join("items.csv"), ITEMS).unwrap();
    fs::write(data.join("item_categories.csv"), CATEGORIES).unwrap();
    fs::write(data.join("interested_sales_trends.csv"), filter).unwrap();
    // shops.csv deliberately absent: it is never read
    dir
}

fn config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig::new(dir.path().join("data"), dir.path().join("out"))
}

fn output(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join("out").join(name)).unwrap()
}

#[test]
fn test_matching_filter_keeps_both_rows() {
    let dir = dataset("shop_id,item_id\n1,10\n");
    let summary = run_pipeline(&config(&dir)).unwrap();

    assert_eq!(summary.sales_rows, 2);
    assert_eq!(summary.final_rows, 2);
    assert_eq!(summary.outputs.len(), 6);

    assert_eq!(
        output(&dir, "final_data.csv"),
        ",date,shop_id,item_id,item_price,item_cnt_day,total_revenue,month,year,date_block_num,item_category_id\n\
         0,2015-01-01,1,10,100.0,3.0,300.0,1,2015,0,5\n\
         1,2015-01-01,1,10,100.0,2.0,200.0,1,2015,0,5\n"
    );
}

#[test]
fn test_pivot_outputs() {
    let dir = dataset("shop_id,item_id\n1,10\n");
    run_pipeline(&config(&dir)).unwrap();

    assert_eq!(
        output(&dir, "sales_pivot.csv"),
        ",month,1\n,year,2015\nshop_id,item_id,\n1,10,5.0\n"
    );
    assert_eq!(output(&dir, "price_pivot.csv"), "item_category_id,item_price\n5,100.0\n");
    assert_eq!(output(&dir, "shop_sales_pivot.csv"), "shop_id,0\n1,500.0\n");
    assert_eq!(
        output(&dir, "category_sales_pivot.csv"),
        "month,1\nyear,2015\nitem_category_id,\n5,500.0\n"
    );
    assert_eq!(
        output(&dir, "top_items_pivot.csv"),
        "item_id,item_category_id,1\n10,5,5.0\n"
    );
}

#[test]
fn test_non_matching_filter_empties_final_table() {
    let dir = dataset("shop_id,item_id\n2,10\n");
    let summary = run_pipeline(&config(&dir)).unwrap();

    assert_eq!(summary.sales_rows, 2);
    assert_eq!(summary.final_rows, 0);

    let final_data = output(&dir, "final_data.csv");
    assert_eq!(final_data.lines().count(), 1);
    assert!(final_data.starts_with(",date,shop_id,item_id"));

    // daily pivots still cover every sale
    assert_eq!(output(&dir, "shop_sales_pivot.csv"), "shop_id,0\n1,500.0\n");
    assert_eq!(output(&dir, "top_items_pivot.csv"), "item_id,item_category_id\n");
}

#[test]
fn test_missing_input_aborts_before_writing() {
    let dir = dataset("shop_id,item_id\n1,10\n");
    fs::remove_file(dir.path().join("data").join("items.csv")).unwrap();

    let err = run_pipeline(&config(&dir)).unwrap_err();
    match err {
        PipelineError::Extract(ExtractError::MissingFile(path)) => {
            assert!(path.ends_with("items.csv"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("out").join("final_data.csv").exists());
}

#[test]
fn test_failure_is_logged() {
    let dir = dataset("shop_id,item_id\n1,10\n");
    fs::remove_file(dir.path().join("data").join("item_categories.csv")).unwrap();
    let logs = LOG_BROADCASTER.subscribe();

    assert!(run_pipeline(&config(&dir)).is_err());
    assert!(logs
        .try_iter()
        .any(|entry| entry.level == LogLevel::Error && entry.message.contains("item_categories.csv")));
}

#[test]
fn test_input_date_blocks_reach_shop_pivot() {
    let dir = dataset("shop_id,item_id\n1,10\n");
    fs::write(
        dir.path().join("data").join("daily_sales.csv"),
        "date,date_block_num,shop_id,item_id,item_price,item_cnt_day\n\
         02.01.2013,0,1,10,5,1\n\
         03.03.2013,2,1,10,5,2\n",
    )
    .unwrap();

    run_pipeline(&config(&dir)).unwrap();
    assert_eq!(output(&dir, "shop_sales_pivot.csv"), "shop_id,0,2\n1,5.0,10.0\n");
}

#[test]
fn test_bad_date_aborts_run() {
    let dir = dataset("shop_id,item_id\n1,10\n");
    fs::write(
        dir.path().join("data").join("daily_sales.csv"),
        "date,shop_id,item_id,item_price,item_cnt_day\n2015-01-01,1,10,5,1\n",
    )
    .unwrap();

    let err = run_pipeline(&config(&dir)).unwrap_err();
    assert!(matches!(err, PipelineError::Transform(_)));
    assert!(err.to_string().starts_with("Transform failed"));
}

#[test]
fn test_unwritable_output_dir() {
    let dir = dataset("shop_id,item_id\n1,10\n");
    let config = PipelineConfig::new(dir.path().join("data"), dir.path().join("nope"));

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Load(_)));
    assert!(err.to_string().contains("final_data.csv"));
}

#[test]
fn test_summary_json() {
    let dir = dataset("shop_id,item_id\n1,10\n");
    let summary = run_pipeline(&config(&dir)).unwrap();
    let path = dir.path().join("out").join("summary.json");
    summary.write_json(&path).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["final_rows"], 2);
    assert_eq!(json["outputs"].as_array().unwrap().len(), 6);
    assert!(Path::new(json["outputs"][0]["path"].as_str().unwrap()).ends_with("final_data.csv"));
}
