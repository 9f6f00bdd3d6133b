//! Anomaly detection: low-quality columns, outliers, suspect values.

use std::collections::BTreeMap;

use dataset_store::{ColumnType, Row};

use crate::cells;
use crate::models::{
    ColumnProfile, InsightsAnomalies, MissingColumnAnomaly, OutlierAnomaly, SuspectValueAnomaly,
};
use crate::outliers::{OutlierMethod, detect_outlier_indices};

const LONG_TEXT_CHARS: usize = 200;
const EXAMPLE_CHARS: usize = 120;
const INVALID_DATETIME_RATE: f64 = 0.2;

/// Collects all anomalies for one computation.
///
/// Columns above the missing threshold are flagged but still profiled and
/// reported elsewhere; flagging never excludes a column.
pub fn build_anomalies(
    sample: &[Row],
    profiles: &BTreeMap<String, ColumnProfile>,
    missing_threshold: f64,
    method: OutlierMethod,
) -> InsightsAnomalies {
    let mut missing_columns = Vec::new();
    let mut outliers = Vec::new();

    for (column, profile) in profiles {
        if profile.missing_rate > missing_threshold {
            missing_columns.push(MissingColumnAnomaly {
                column: column.clone(),
                missing_rate: profile.missing_rate,
            });
        }
        if profile.column_type == ColumnType::Numeric {
            let values: Vec<(usize, f64)> = sample
                .iter()
                .enumerate()
                .filter_map(|(i, row)| cells::as_number(row.get(column)).map(|v| (i, v)))
                .collect();
            let indices = detect_outlier_indices(&values, method);
            if !indices.is_empty() {
                outliers.push(OutlierAnomaly {
                    column: column.clone(),
                    method,
                    indices,
                });
            }
        }
    }

    let suspect_values = detect_suspect_values(sample, profiles);
    InsightsAnomalies {
        missing_columns,
        outliers,
        suspect_values,
    }
}

fn detect_suspect_values(
    sample: &[Row],
    profiles: &BTreeMap<String, ColumnProfile>,
) -> Vec<SuspectValueAnomaly> {
    let mut suspects = Vec::new();

    for (column, profile) in profiles {
        match profile.column_type {
            ColumnType::Text => {
                let strings: Vec<String> = sample
                    .iter()
                    .filter_map(|row| cells::as_category(row.get(column)))
                    .collect();
                if strings.iter().any(|s| s.chars().count() > LONG_TEXT_CHARS) {
                    let example = strings
                        .first()
                        .map(|s| s.chars().take(EXAMPLE_CHARS).collect());
                    suspects.push(SuspectValueAnomaly {
                        column: column.clone(),
                        issue: "very long strings detected".into(),
                        example,
                    });
                }
            }
            ColumnType::Datetime => {
                let total = sample
                    .iter()
                    .filter(|row| !cells::is_missing(row.get(column)))
                    .count();
                if total == 0 {
                    continue;
                }
                let invalid = sample
                    .iter()
                    .filter(|row| {
                        !cells::is_missing(row.get(column))
                            && !cells::is_datetime(row.get(column))
                    })
                    .count();
                let invalid_rate = invalid as f64 / total as f64;
                if invalid_rate > INVALID_DATETIME_RATE {
                    suspects.push(SuspectValueAnomaly {
                        column: column.clone(),
                        issue: format!("invalid datetime rate {invalid_rate:.2}"),
                        example: None,
                    });
                }
            }
            _ => {}
        }
    }
    suspects
}

/// Turns anomalies into short, actionable lines for the report.
pub fn build_recommendations(anomalies: &InsightsAnomalies) -> Vec<String> {
    let mut out = Vec::new();
    if !anomalies.missing_columns.is_empty() {
        let columns: Vec<&str> = anomalies
            .missing_columns
            .iter()
            .map(|a| a.column.as_str())
            .collect();
        out.push(format!(
            "Review missing data for columns: {}.",
            columns.join(", ")
        ));
    }
    if !anomalies.outliers.is_empty() {
        let columns: Vec<&str> = anomalies.outliers.iter().map(|a| a.column.as_str()).collect();
        out.push(format!(
            "Inspect outliers in numeric columns: {}.",
            columns.join(", ")
        ));
    }
    if !anomalies.suspect_values.is_empty() {
        let columns: Vec<&str> = anomalies
            .suspect_values
            .iter()
            .map(|a| a.column.as_str())
            .collect();
        out.push(format!(
            "Validate suspect values in columns: {}.",
            columns.join(", ")
        ));
    }
    if out.is_empty() {
        out.push("No major issues detected in the sampled data.".into());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiling::build_column_profiles;
    use chrono::Utc;
    use serde_json::json;

    fn meta(columns: &[&str], nb_rows: u64) -> dataset_store::DatasetMeta {
        dataset_store::DatasetMeta {
            dataset_id: "ds1".into(),
            filename: "data.csv".into(),
            created_at: Utc::now(),
            nb_rows,
            nb_columns: columns.len() as u64,
            columns: columns.iter().map(|s| s.to_string()).collect(),
            column_types: BTreeMap::new(),
            numeric_summary: BTreeMap::new(),
            top_values: BTreeMap::new(),
            warnings: vec![],
        }
    }

    #[test]
    fn flags_missing_columns_and_outliers() {
        let m = meta(&["v", "gap"], 5);
        let sample: Vec<Row> = [
            json!({"v": 1, "gap": null}),
            json!({"v": 2, "gap": null}),
            json!({"v": 2, "gap": "x"}),
            json!({"v": 3, "gap": null}),
            json!({"v": 100, "gap": null}),
        ]
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let profiles = build_column_profiles(&m, &sample);
        let anomalies = build_anomalies(&sample, &profiles, 0.3, OutlierMethod::Iqr);

        assert_eq!(anomalies.missing_columns.len(), 1);
        assert_eq!(anomalies.missing_columns[0].column, "gap");
        assert_eq!(anomalies.outliers.len(), 1);
        assert_eq!(anomalies.outliers[0].column, "v");
        assert_eq!(anomalies.outliers[0].indices, vec![4]);

        let recs = build_recommendations(&anomalies);
        assert!(recs.iter().any(|r| r.contains("missing data")));
        assert!(recs.iter().any(|r| r.contains("outliers")));
    }

    #[test]
    fn clean_data_gets_the_default_recommendation() {
        let anomalies = InsightsAnomalies {
            missing_columns: vec![],
            outliers: vec![],
            suspect_values: vec![],
        };
        let recs = build_recommendations(&anomalies);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].contains("No major issues"));
    }
}
