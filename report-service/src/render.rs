//! Report content: the compact JSON handed to the LLM and the deterministic
//! markdown template used when no LLM is available.
//!
//! The compact payload keeps the prompt small on wide datasets: the five
//! worst missing columns, up to five numeric summaries, up to three
//! categorical top-value lists, plus every anomaly and recommendation.

use std::cmp::Ordering;

use serde_json::{Map, Value, json};

use insights_engine::{ChartSpec, InsightsReport, MissingColumnAnomaly};

pub(crate) fn compact_payload(report: &InsightsReport, charts: &[ChartSpec]) -> Value {
    let mut missing: Vec<&MissingColumnAnomaly> =
        report.anomalies.missing_columns.iter().collect();
    missing.sort_by(|a, b| {
        b.missing_rate
            .partial_cmp(&a.missing_rate)
            .unwrap_or(Ordering::Equal)
    });
    missing.truncate(5);

    let mut numeric = Map::new();
    let mut categorical = Map::new();
    for (column, profile) in &report.column_profiles {
        if numeric.len() < 5 {
            if let Some(summary) = &profile.numeric_summary {
                numeric.insert(column.clone(), json!(summary));
            }
        }
        if categorical.len() < 3 {
            if let Some(top) = &profile.top_values {
                categorical.insert(column.clone(), json!(top));
            }
        }
        if numeric.len() >= 5 && categorical.len() >= 3 {
            break;
        }
    }

    json!({
        "insights": {
            "dataset_overview": report.dataset_overview,
            "missing_columns": missing,
            "outliers": report.anomalies.outliers,
            "suspect_values": report.anomalies.suspect_values,
            "recommendations": report.recommendations,
            "numeric_columns": numeric,
            "categorical_columns": categorical,
        },
        "charts": charts,
    })
}

/// Markdown report built straight from the insights, no LLM involved.
/// Sections match what the LLM is asked to write, and the Key Insights
/// section always carries exactly five bullets.
pub(crate) fn report_template(report: &InsightsReport, charts: &[ChartSpec]) -> String {
    let overview = &report.dataset_overview;
    let anomalies = &report.anomalies;

    let mut lines = vec![
        "# Executive Report".to_string(),
        String::new(),
        "## Dataset Summary".to_string(),
        format!("- Rows: {}", overview.rows),
        format!("- Columns: {}", overview.cols),
        format!(
            "- Missing rate (global): {:.2}%",
            overview.missing_rate_global * 100.0
        ),
        String::new(),
        "## Key Insights".to_string(),
    ];

    let mut key_insights: Vec<String> = Vec::new();
    if !anomalies.missing_columns.is_empty() {
        let cols = join_columns(anomalies.missing_columns.iter().map(|m| m.column.as_str()));
        key_insights.push(format!("High missing rate in columns: {cols}."));
    }
    if !anomalies.outliers.is_empty() {
        let cols = join_columns(anomalies.outliers.iter().map(|o| o.column.as_str()));
        key_insights.push(format!("Outliers detected in numeric columns: {cols}."));
    }
    if !anomalies.suspect_values.is_empty() {
        let cols = join_columns(anomalies.suspect_values.iter().map(|s| s.column.as_str()));
        key_insights.push(format!("Suspect values detected in columns: {cols}."));
    }
    let numeric_ranges = report
        .column_profiles
        .iter()
        .filter_map(|(col, p)| p.numeric_summary.as_ref().map(|s| (col, s)))
        .take(2);
    for (col, summary) in numeric_ranges {
        key_insights.push(format!(
            "{col} ranges from {} to {} (p95 {}).",
            summary.min, summary.max, summary.p95
        ));
    }
    while key_insights.len() < 5 {
        key_insights.push("No additional insights from the sample.".to_string());
    }
    lines.extend(key_insights.into_iter().take(5).map(|s| format!("- {s}")));

    lines.extend([
        String::new(),
        "## Anomalies".to_string(),
        format!("- Missing columns: {}", anomalies.missing_columns.len()),
        format!("- Outlier columns: {}", anomalies.outliers.len()),
        format!("- Suspect values: {}", anomalies.suspect_values.len()),
        String::new(),
        "## Recommended Charts".to_string(),
    ]);
    if charts.is_empty() {
        lines.push("- No charts suggested.".to_string());
    } else {
        for chart in charts {
            lines.push(format!("- {} ({})", chart.title, chart.chart_type.as_str()));
        }
    }

    lines.extend([String::new(), "## Recommendations".to_string()]);
    for rec in &report.recommendations {
        lines.push(format!("- {rec}"));
    }

    format!("{}\n", lines.join("\n").trim_end())
}

fn join_columns<'a>(cols: impl Iterator<Item = &'a str>) -> String {
    cols.take(5).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;

    use insights_engine::{
        ColumnProfile, DatasetOverview, InsightsAnomalies, NumericSummary, OutlierAnomaly,
        OutlierMethod, TopValue,
    };

    fn sample_report() -> InsightsReport {
        let mut column_profiles = BTreeMap::new();
        column_profiles.insert(
            "amount".to_string(),
            ColumnProfile {
                column_type: dataset_store::ColumnType::Numeric,
                missing_rate: 0.0,
                unique_count: 8,
                unique_rate: 0.2,
                top_values: None,
                numeric_summary: Some(NumericSummary {
                    min: 10.0,
                    max: 5000.0,
                    mean: 130.0,
                    std: 700.0,
                    p50: 12.0,
                    p95: 16.0,
                }),
            },
        );
        column_profiles.insert(
            "country".to_string(),
            ColumnProfile {
                column_type: dataset_store::ColumnType::Categorical,
                missing_rate: 0.0,
                unique_count: 2,
                unique_rate: 0.05,
                top_values: Some(vec![TopValue {
                    value: "FR".into(),
                    count: 14,
                }]),
                numeric_summary: None,
            },
        );

        InsightsReport {
            dataset_id: "orders".into(),
            generated_at: Utc::now(),
            sample_rows_used: 41,
            target_column: None,
            dataset_overview: DatasetOverview {
                rows: 41,
                cols: 4,
                missing_rate_global: 0.015,
            },
            column_profiles,
            anomalies: InsightsAnomalies {
                missing_columns: vec![],
                outliers: vec![OutlierAnomaly {
                    column: "amount".into(),
                    method: OutlierMethod::Iqr,
                    indices: vec![40],
                }],
                suspect_values: vec![],
            },
            recommendations: vec!["Inspect outliers in: amount.".into()],
        }
    }

    #[test]
    fn template_has_every_section_and_five_key_bullets() {
        let text = report_template(&sample_report(), &[]);

        assert!(text.starts_with("# Executive Report"));
        for section in [
            "## Dataset Summary",
            "## Key Insights",
            "## Anomalies",
            "## Recommended Charts",
            "## Recommendations",
        ] {
            assert!(text.contains(section), "missing {section}");
        }

        let key = text
            .split("## Key Insights\n")
            .nth(1)
            .unwrap()
            .split("\n\n")
            .next()
            .unwrap();
        assert_eq!(key.lines().count(), 5);
        assert!(key.contains("Outliers detected in numeric columns: amount."));
        assert!(key.contains("No additional insights from the sample."));

        assert!(text.contains("- No charts suggested."));
        assert!(text.contains("- Missing rate (global): 1.50%"));
    }

    #[test]
    fn compact_payload_keeps_prompts_small() {
        let report = sample_report();
        let payload = compact_payload(&report, &[]);

        let insights = &payload["insights"];
        assert_eq!(insights["dataset_overview"]["rows"], 41);
        assert_eq!(insights["numeric_columns"]["amount"]["max"], 5000.0);
        assert_eq!(
            insights["categorical_columns"]["country"][0]["value"],
            "FR"
        );
        assert_eq!(insights["outliers"][0]["column"], "amount");
        assert_eq!(payload["charts"], json!([]));
    }
}
