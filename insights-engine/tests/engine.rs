//! End-to-end insights runs over a dataset written to a temp directory.

use std::collections::BTreeMap;
use std::fs;

use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;

use dataset_store::{DatasetMeta, DatasetStore};
use insights_engine::{
    ChartParams, ChartType, InsightsConfig, InsightsEngine, InsightsParams, OutlierMethod,
};

fn write_dataset(dir: &TempDir, dataset_id: &str, rows: &[serde_json::Value]) {
    let columns: Vec<String> = rows[0]
        .as_object()
        .unwrap()
        .keys()
        .map(|k| k.to_string())
        .collect();
    let meta = DatasetMeta {
        dataset_id: dataset_id.to_string(),
        filename: "orders.csv".to_string(),
        created_at: Utc::now(),
        nb_rows: rows.len() as u64,
        nb_columns: columns.len() as u64,
        columns,
        column_types: BTreeMap::new(),
        numeric_summary: BTreeMap::new(),
        top_values: BTreeMap::new(),
        warnings: vec![],
    };

    let ds_dir = dir.path().join(dataset_id);
    fs::create_dir_all(&ds_dir).unwrap();
    fs::write(
        ds_dir.join("metadata.json"),
        serde_json::to_string_pretty(&meta).unwrap(),
    )
    .unwrap();
    let jsonl: String = rows
        .iter()
        .map(|r| serde_json::to_string(r).unwrap() + "\n")
        .collect();
    fs::write(ds_dir.join("rows.jsonl"), jsonl).unwrap();
}

fn orders_rows() -> Vec<serde_json::Value> {
    let mut rows: Vec<serde_json::Value> = (0..40)
        .map(|i| {
            json!({
                "amount": 10 + (i % 7),
                "qty": 1 + (i % 3),
                "country": if i % 3 == 0 { "FR" } else { "DE" },
                "day": format!("2025-01-{:02}", 1 + (i % 28)),
            })
        })
        .collect();
    rows.push(json!({"amount": 5000, "qty": 2, "country": "FR", "day": "2025-01-29"}));
    rows
}

fn engine_over(dir: &TempDir, cfg: InsightsConfig) -> InsightsEngine {
    InsightsEngine::new(cfg, DatasetStore::new(dir.path()))
}

#[tokio::test]
async fn report_covers_profiles_anomalies_and_recommendations() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir, "orders", &orders_rows());
    let engine = engine_over(&dir, InsightsConfig::default());

    let report = engine
        .compute_insights("orders", &InsightsParams::default())
        .await
        .unwrap()
        .report;

    assert_eq!(report.dataset_id, "orders");
    assert_eq!(report.sample_rows_used, 41);
    assert_eq!(report.dataset_overview.rows, 41);
    assert_eq!(report.dataset_overview.cols, 4);

    assert_eq!(report.column_profiles["amount"].column_type.as_str(), "numeric");
    assert_eq!(report.column_profiles["country"].column_type.as_str(), "categorical");
    assert_eq!(report.column_profiles["day"].column_type.as_str(), "datetime");

    // The 5000 spike at sample position 40 is the only IQR outlier.
    let outlier = report
        .anomalies
        .outliers
        .iter()
        .find(|o| o.column == "amount")
        .unwrap();
    assert_eq!(outlier.indices, vec![40]);
    assert!(
        report
            .recommendations
            .iter()
            .any(|r| r.contains("outliers"))
    );
}

#[tokio::test]
async fn zscore_with_zero_spread_flags_nothing() {
    let dir = TempDir::new().unwrap();
    let rows: Vec<serde_json::Value> = (0..10).map(|_| json!({"flat": 7})).collect();
    write_dataset(&dir, "flat", &rows);

    let cfg = InsightsConfig {
        outlier_method: OutlierMethod::Zscore,
        ..InsightsConfig::default()
    };
    let engine = engine_over(&dir, cfg);

    let report = engine
        .compute_insights("flat", &InsightsParams::default())
        .await
        .unwrap()
        .report;
    assert!(report.anomalies.outliers.is_empty());
    assert_eq!(
        report.recommendations,
        vec!["No major issues detected in the sampled data.".to_string()]
    );
}

#[tokio::test]
async fn unknown_target_column_is_a_validation_error() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir, "orders", &orders_rows());
    let engine = engine_over(&dir, InsightsConfig::default());

    let err = engine
        .compute_insights(
            "orders",
            &InsightsParams {
                target_column: Some("nope".into()),
                ..InsightsParams::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION");
}

#[tokio::test]
async fn missing_dataset_maps_to_not_found() {
    let dir = TempDir::new().unwrap();
    let engine = engine_over(&dir, InsightsConfig::default());

    let err = engine
        .compute_insights("ghost", &InsightsParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

#[tokio::test]
async fn cache_returns_the_same_report_until_forced() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir, "orders", &orders_rows());
    let engine = engine_over(&dir, InsightsConfig::default());

    let first = engine
        .compute_insights("orders", &InsightsParams::default())
        .await
        .unwrap();
    assert!(!first.cached);
    let second = engine
        .compute_insights("orders", &InsightsParams::default())
        .await
        .unwrap();
    assert!(second.cached);
    assert_eq!(first.report.generated_at, second.report.generated_at);

    let forced = engine
        .compute_insights(
            "orders",
            &InsightsParams {
                force_recompute: true,
                ..InsightsParams::default()
            },
        )
        .await
        .unwrap();
    assert!(!forced.cached);
    assert!(forced.report.generated_at >= first.report.generated_at);

    // A different sample size is a different cache key.
    let smaller = engine
        .compute_insights(
            "orders",
            &InsightsParams {
                sample_rows: Some(10),
                ..InsightsParams::default()
            },
        )
        .await
        .unwrap();
    assert!(!smaller.cached);
    assert_eq!(smaller.report.sample_rows_used, 10);
}

#[tokio::test]
async fn chart_suggestions_cover_the_main_shapes() {
    let dir = TempDir::new().unwrap();
    write_dataset(&dir, "orders", &orders_rows());
    let engine = engine_over(&dir, InsightsConfig::default());

    let charts = engine
        .suggest_charts("orders", &ChartParams::default())
        .await
        .unwrap();
    assert!(!charts.is_empty());
    assert!(charts.len() <= 3);
    // Datetime column present, so a line chart leads the fallback order.
    assert_eq!(charts[0].chart_type, ChartType::Line);

    let question = ChartParams {
        question: Some("What is the share of each country?".into()),
        max_charts: 3,
    };
    let charts = engine.suggest_charts("orders", &question).await.unwrap();
    assert_eq!(charts[0].chart_type, ChartType::Pie);
    assert_eq!(charts[0].x.as_deref(), Some("country"));
}

#[tokio::test]
async fn low_frequency_categories_fold_into_other() {
    let dir = TempDir::new().unwrap();
    // 12 distinct categories; cap at 5 points keeps 4 plus "other".
    let rows: Vec<serde_json::Value> = (0..60)
        .map(|i| json!({"cat": format!("c{:02}", i % 12)}))
        .collect();
    write_dataset(&dir, "cats", &rows);

    let cfg = InsightsConfig {
        charts_max_points: 5,
        ..InsightsConfig::default()
    };
    let engine = engine_over(&dir, cfg);

    let charts = engine
        .suggest_charts("cats", &ChartParams::default())
        .await
        .unwrap();
    let bar = charts
        .iter()
        .find(|c| c.chart_type == ChartType::Bar)
        .unwrap();

    let labels = &bar.data_preview["x"];
    let counts = &bar.data_preview["y"];
    assert_eq!(labels.len(), 5);
    assert_eq!(labels.last().unwrap(), &json!("other"));
    let total: u64 = counts.iter().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 60);
}
