//! Report types returned by the insights and chart engines.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dataset_store::ColumnType;

use crate::outliers::OutlierMethod;

/// Aggregates over one numeric column (population std, ddof = 0).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub p50: f64,
    pub p95: f64,
}

/// One frequent value of a categorical column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopValue {
    pub value: String,
    pub count: u64,
}

/// Per-column profile over the sampled rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub missing_rate: f64,
    pub unique_count: usize,
    pub unique_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_values: Option<Vec<TopValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_summary: Option<NumericSummary>,
}

/// Dataset-wide figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub rows: u64,
    pub cols: u64,
    pub missing_rate_global: f64,
}

/// Column whose missing ratio exceeds the configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingColumnAnomaly {
    pub column: String,
    pub missing_rate: f64,
}

/// Numeric column with flagged outlier rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierAnomaly {
    pub column: String,
    pub method: OutlierMethod,
    /// Sample row indices (0-based), capped at 20.
    pub indices: Vec<usize>,
}

/// Value-level oddity worth a human look.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspectValueAnomaly {
    pub column: String,
    pub issue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

/// All detected anomalies for one computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsAnomalies {
    pub missing_columns: Vec<MissingColumnAnomaly>,
    pub outliers: Vec<OutlierAnomaly>,
    pub suspect_values: Vec<SuspectValueAnomaly>,
}

/// Full insights report for one (dataset, sample, target) key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsReport {
    pub dataset_id: String,
    pub generated_at: DateTime<Utc>,
    pub sample_rows_used: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    pub dataset_overview: DatasetOverview,
    pub column_profiles: BTreeMap<String, ColumnProfile>,
    pub anomalies: InsightsAnomalies,
    pub recommendations: Vec<String>,
}

/// One suggested chart: what to draw and a small data preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    pub data_preview: BTreeMap<String, Vec<Value>>,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Pie,
    Histogram,
    Line,
    Scatter,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Pie => "pie",
            ChartType::Histogram => "histogram",
            ChartType::Line => "line",
            ChartType::Scatter => "scatter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Avg,
    Count,
}
