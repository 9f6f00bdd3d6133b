//! Column profiling over a deterministic row sample.
//!
//! Type inference rules, applied per column to the non-missing cells:
//! 1. numeric    -> parse rate ≥ 0.8 (numbers or numeric strings)
//! 2. boolean    -> every cell is a bool or "true"/"false"
//! 3. datetime   -> parse rate ≥ 0.8 in common date formats
//! 4. categorical -> unique rate ≤ 0.2 or ≤ 20 distinct values
//! 5. text       -> everything else

use std::collections::BTreeMap;

use dataset_store::{ColumnType, DatasetMeta, Row};

use crate::cells;
use crate::models::{ColumnProfile, DatasetOverview, NumericSummary, TopValue};
use crate::stats::{mean, quantile_sorted, std_pop};

const PARSE_RATE_MIN: f64 = 0.8;
const CATEGORICAL_UNIQUE_RATE_MAX: f64 = 0.2;
const CATEGORICAL_UNIQUE_COUNT_MAX: usize = 20;
const TOP_VALUES: usize = 5;

/// Dataset-wide overview: row/column counts from metadata, global missing
/// rate from the sample.
pub fn build_overview(meta: &DatasetMeta, sample: &[Row]) -> DatasetOverview {
    let cells_total = (sample.len() as u64 * meta.nb_columns).max(1);
    let missing: u64 = sample
        .iter()
        .flat_map(|row| meta.columns.iter().map(|c| cells::is_missing(row.get(c))))
        .filter(|m| *m)
        .count() as u64;

    DatasetOverview {
        rows: meta.nb_rows,
        cols: meta.nb_columns,
        missing_rate_global: missing as f64 / cells_total as f64,
    }
}

/// Profiles every column of the sample.
pub fn build_column_profiles(
    meta: &DatasetMeta,
    sample: &[Row],
) -> BTreeMap<String, ColumnProfile> {
    let mut out = BTreeMap::new();
    for column in &meta.columns {
        out.insert(column.clone(), profile_column(column, sample));
    }
    out
}

fn profile_column(column: &str, sample: &[Row]) -> ColumnProfile {
    let total = sample.len();
    let cells_vec: Vec<Option<&serde_json::Value>> =
        sample.iter().map(|row| row.get(column)).collect();

    let present: Vec<Option<&serde_json::Value>> = cells_vec
        .iter()
        .copied()
        .filter(|c| !cells::is_missing(*c))
        .collect();

    let missing_rate = if total > 0 {
        (total - present.len()) as f64 / total as f64
    } else {
        0.0
    };

    let mut distinct: Vec<String> = present
        .iter()
        .filter_map(|c| cells::as_category(*c))
        .collect();
    distinct.sort();
    distinct.dedup();
    let unique_count = distinct.len();
    let unique_rate = if total > 0 {
        unique_count as f64 / total as f64
    } else {
        0.0
    };

    let column_type = infer_type(&present, unique_count, unique_rate);

    let numeric_summary = (column_type == ColumnType::Numeric)
        .then(|| numeric_summary(&present))
        .flatten();
    let top_values =
        (column_type == ColumnType::Categorical).then(|| top_values(&present, TOP_VALUES));

    ColumnProfile {
        column_type,
        missing_rate,
        unique_count,
        unique_rate,
        top_values,
        numeric_summary,
    }
}

fn infer_type(
    present: &[Option<&serde_json::Value>],
    unique_count: usize,
    unique_rate: f64,
) -> ColumnType {
    if present.is_empty() {
        return ColumnType::Text;
    }
    let n = present.len() as f64;

    let numeric = present.iter().filter(|c| cells::as_number(**c).is_some()).count();
    if numeric as f64 / n >= PARSE_RATE_MIN {
        return ColumnType::Numeric;
    }

    if present.iter().all(|c| cells::is_bool(*c)) {
        return ColumnType::Boolean;
    }

    let datetimes = present.iter().filter(|c| cells::is_datetime(**c)).count();
    if datetimes as f64 / n >= PARSE_RATE_MIN {
        return ColumnType::Datetime;
    }

    if unique_rate <= CATEGORICAL_UNIQUE_RATE_MAX || unique_count <= CATEGORICAL_UNIQUE_COUNT_MAX {
        return ColumnType::Categorical;
    }
    ColumnType::Text
}

fn numeric_summary(present: &[Option<&serde_json::Value>]) -> Option<NumericSummary> {
    let mut values: Vec<f64> = present.iter().filter_map(|c| cells::as_number(*c)).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Some(NumericSummary {
        min: values[0],
        max: values[values.len() - 1],
        mean: mean(&values)?,
        std: std_pop(&values)?,
        p50: quantile_sorted(&values, 0.5)?,
        p95: quantile_sorted(&values, 0.95)?,
    })
}

/// Top-N category frequencies, count descending, value ascending on ties.
fn top_values(present: &[Option<&serde_json::Value>], n: usize) -> Vec<TopValue> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for c in present {
        if let Some(v) = cells::as_category(*c) {
            *counts.entry(v).or_insert(0) += 1;
        }
    }
    let mut items: Vec<TopValue> = counts
        .into_iter()
        .map(|(value, count)| TopValue { value, count })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count).then(a.value.cmp(&b.value)));
    items.truncate(n);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn meta(columns: &[&str], nb_rows: u64) -> DatasetMeta {
        DatasetMeta {
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

    fn rows(json_rows: &[serde_json::Value]) -> Vec<Row> {
        json_rows
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn infers_types_per_column() {
        let m = meta(&["amount", "city", "when", "flag"], 5);
        let sample = rows(&[
            json!({"amount": 1, "city": "Paris", "when": "2025-01-01", "flag": true}),
            json!({"amount": "2.5", "city": "Paris", "when": "2025-01-02", "flag": false}),
            json!({"amount": 3, "city": "Berlin", "when": "2025-01-03", "flag": true}),
            json!({"amount": 4, "city": "Paris", "when": "2025-01-04", "flag": false}),
            json!({"amount": 5, "city": "Rome", "when": "2025-01-05", "flag": true}),
        ]);

        let profiles = build_column_profiles(&m, &sample);
        assert_eq!(profiles["amount"].column_type, ColumnType::Numeric);
        assert_eq!(profiles["city"].column_type, ColumnType::Categorical);
        assert_eq!(profiles["when"].column_type, ColumnType::Datetime);
        assert_eq!(profiles["flag"].column_type, ColumnType::Boolean);
    }

    #[test]
    fn numeric_summary_uses_population_std() {
        let m = meta(&["v"], 8);
        let sample = rows(&[
            json!({"v": 2}), json!({"v": 4}), json!({"v": 4}), json!({"v": 4}),
            json!({"v": 5}), json!({"v": 5}), json!({"v": 7}), json!({"v": 9}),
        ]);
        let profiles = build_column_profiles(&m, &sample);
        let s = profiles["v"].numeric_summary.as_ref().unwrap();
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.std, 2.0);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
    }

    #[test]
    fn top_values_rank_count_desc_then_value_asc() {
        let m = meta(&["c"], 5);
        let sample = rows(&[
            json!({"c": "b"}),
            json!({"c": "a"}),
            json!({"c": "b"}),
            json!({"c": "a"}),
            json!({"c": "z"}),
        ]);
        let profiles = build_column_profiles(&m, &sample);
        let top = profiles["c"].top_values.as_ref().unwrap();
        assert_eq!(top[0].value, "a");
        assert_eq!(top[1].value, "b");
        assert_eq!(top[2].value, "z");
    }

    #[test]
    fn missing_rates_count_null_and_absent() {
        let m = meta(&["a", "b"], 4);
        let sample = rows(&[
            json!({"a": 1, "b": "x"}),
            json!({"a": null, "b": ""}),
            json!({"a": 3}),
            json!({"a": 4, "b": "y"}),
        ]);

        let profiles = build_column_profiles(&m, &sample);
        assert_eq!(profiles["a"].missing_rate, 0.25);
        assert_eq!(profiles["b"].missing_rate, 0.5);

        let overview = build_overview(&m, &sample);
        assert_eq!(overview.missing_rate_global, 3.0 / 8.0);
    }
}
