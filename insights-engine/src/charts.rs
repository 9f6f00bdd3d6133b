//! Chart suggestions from schema + insights, independent of the vector index.
//!
//! The heuristic ranks candidates by column-type pairing: datetime → line,
//! categorical(-vs-numeric) → bar, numeric-vs-numeric → scatter, single
//! numeric → histogram, categorical share questions → pie. Question keywords
//! pick the lead chart. Each chart is capped at `max_points` rendered points
//! via binning or aggregation; low-frequency categories collapse into an
//! explicit "other" bucket so nothing is dropped silently.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use tracing::debug;

use dataset_store::{ColumnType, Row};

use crate::cells;
use crate::models::{Aggregation, ChartSpec, ChartType, ColumnProfile, InsightsReport};

/// Bucket label for merged low-frequency categories.
const OTHER_BUCKET: &str = "other";

/// Produces up to `max_charts` chart specifications.
pub fn suggest_charts(
    insights: &InsightsReport,
    sample: &[Row],
    question: Option<&str>,
    max_charts: usize,
    max_points: usize,
) -> Vec<ChartSpec> {
    let profiles = &insights.column_profiles;
    let numeric_cols = cols_of(profiles, ColumnType::Numeric);
    let categorical_cols = cols_of(profiles, ColumnType::Categorical);
    let datetime_cols = cols_of(profiles, ColumnType::Datetime);

    let mut charts: Vec<ChartSpec> = Vec::new();
    let mut seen: Vec<(ChartType, Option<String>, Option<String>)> = Vec::new();

    let mut add = |charts: &mut Vec<ChartSpec>, chart: Option<ChartSpec>| {
        if let Some(c) = chart {
            let key = (c.chart_type, c.x.clone(), c.y.clone());
            if !seen.contains(&key) {
                seen.push(key);
                charts.push(c);
            }
        }
    };

    if let Some(q) = question {
        let normalized = normalize_question(q);
        if contains_any(&normalized, &["evolution", "trend", "over time", "time"]) {
            if let Some(dt) = datetime_cols.first() {
                add(
                    &mut charts,
                    build_line(sample, dt, numeric_cols.first(), max_points, "Requested trend over time."),
                );
            }
        } else if contains_any(&normalized, &["distribution", "histogram", "repartition"]) {
            if let Some(n) = numeric_cols.first() {
                add(
                    &mut charts,
                    build_histogram(sample, n, max_points, "Requested distribution view."),
                );
            }
        } else if contains_any(&normalized, &["compare", "comparison", "top"]) {
            if let Some(c) = categorical_cols.first() {
                add(
                    &mut charts,
                    build_bar(sample, c, numeric_cols.first(), max_points, "Requested comparison between categories."),
                );
            }
        } else if contains_any(&normalized, &["share", "ratio", "percentage", "proportion"]) {
            if let Some(c) = categorical_cols.first() {
                add(
                    &mut charts,
                    build_pie(sample, c, max_points, "Requested proportional view."),
                );
            }
        }
    }

    if charts.len() < max_charts {
        if let Some(dt) = datetime_cols.first() {
            add(
                &mut charts,
                build_line(sample, dt, numeric_cols.first(), max_points, "Time-based overview."),
            );
        }
    }
    if charts.len() < max_charts {
        if let Some(c) = categorical_cols.first() {
            add(
                &mut charts,
                build_bar(sample, c, numeric_cols.first(), max_points, "Category comparison."),
            );
        }
    }
    if charts.len() < max_charts && numeric_cols.len() >= 2 {
        add(
            &mut charts,
            build_scatter(sample, &numeric_cols[0], &numeric_cols[1], max_points, "Relationship between numeric features."),
        );
    }
    if charts.len() < max_charts {
        if let Some(n) = numeric_cols.first() {
            add(
                &mut charts,
                build_histogram(sample, n, max_points, "Distribution of numeric values."),
            );
        }
    }

    charts.truncate(max_charts);
    debug!(charts = charts.len(), "chart suggestions built");
    charts
}

fn cols_of(profiles: &BTreeMap<String, ColumnProfile>, t: ColumnType) -> Vec<String> {
    profiles
        .iter()
        .filter(|(_, p)| p.column_type == t)
        .map(|(c, _)| c.clone())
        .collect()
}

fn normalize_question(q: &str) -> String {
    q.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Category counts sorted count-descending, value-ascending on ties.
fn category_counts(sample: &[Row], column: &str) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for row in sample {
        if let Some(v) = cells::as_category(row.get(column)) {
            *counts.entry(v).or_insert(0) += 1;
        }
    }
    let mut items: Vec<(String, u64)> = counts.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    items
}

/// Keeps the `max_points - 1` largest buckets and folds the rest into
/// "other", so every observation stays represented.
fn fold_other_u64(items: Vec<(String, u64)>, max_points: usize) -> Vec<(String, u64)> {
    if items.len() <= max_points {
        return items;
    }
    let keep = max_points.saturating_sub(1).max(1);
    let mut out: Vec<(String, u64)> = items[..keep].to_vec();
    let rest: u64 = items[keep..].iter().map(|(_, c)| c).sum();
    out.push((OTHER_BUCKET.to_string(), rest));
    out
}

fn build_bar(
    sample: &[Row],
    category_col: &str,
    numeric_col: Option<&String>,
    max_points: usize,
    notes: &str,
) -> Option<ChartSpec> {
    if let Some(numeric_col) = numeric_col {
        // Mean of the numeric column per category; the "other" bucket is the
        // mean over all folded categories together.
        let mut sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();
        for row in sample {
            let (Some(cat), Some(v)) = (
                cells::as_category(row.get(category_col)),
                cells::as_number(row.get(numeric_col.as_str())),
            ) else {
                continue;
            };
            let e = sums.entry(cat).or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }
        if sums.is_empty() {
            return None;
        }

        let mut items: Vec<(String, f64, u64)> = sums
            .into_iter()
            .map(|(k, (sum, n))| (k, sum / n as f64, n))
            .collect();
        items.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let items = if items.len() > max_points {
            let keep = max_points.saturating_sub(1).max(1);
            let folded = &items[keep..];
            let total: f64 = folded.iter().map(|(_, m, n)| m * *n as f64).sum();
            let count: u64 = folded.iter().map(|(_, _, n)| n).sum();
            let mut out = items[..keep].to_vec();
            out.push((OTHER_BUCKET.to_string(), total / count.max(1) as f64, count));
            out
        } else {
            items
        };

        let x: Vec<Value> = items.iter().map(|(k, _, _)| json!(k)).collect();
        let y: Vec<Value> = items.iter().map(|(_, m, _)| json!(m)).collect();
        return Some(ChartSpec {
            title: format!("Average {numeric_col} by {category_col}"),
            chart_type: ChartType::Bar,
            x: Some(category_col.to_string()),
            y: Some(numeric_col.to_string()),
            aggregation: Some(Aggregation::Avg),
            data_preview: BTreeMap::from([("x".to_string(), x), ("y".to_string(), y)]),
            notes: notes.to_string(),
        });
    }

    let counts = fold_other_u64(category_counts(sample, category_col), max_points);
    if counts.is_empty() {
        return None;
    }
    let x: Vec<Value> = counts.iter().map(|(k, _)| json!(k)).collect();
    let y: Vec<Value> = counts.iter().map(|(_, c)| json!(c)).collect();
    Some(ChartSpec {
        title: format!("Top {category_col} values"),
        chart_type: ChartType::Bar,
        x: Some(category_col.to_string()),
        y: None,
        aggregation: Some(Aggregation::Count),
        data_preview: BTreeMap::from([("x".to_string(), x), ("y".to_string(), y)]),
        notes: notes.to_string(),
    })
}

fn build_pie(sample: &[Row], category_col: &str, max_points: usize, notes: &str) -> Option<ChartSpec> {
    let counts = fold_other_u64(category_counts(sample, category_col), max_points);
    if counts.is_empty() {
        return None;
    }
    let labels: Vec<Value> = counts.iter().map(|(k, _)| json!(k)).collect();
    let values: Vec<Value> = counts.iter().map(|(_, c)| json!(c)).collect();
    Some(ChartSpec {
        title: format!("Share of {category_col}"),
        chart_type: ChartType::Pie,
        x: Some(category_col.to_string()),
        y: None,
        aggregation: Some(Aggregation::Count),
        data_preview: BTreeMap::from([("labels".to_string(), labels), ("values".to_string(), values)]),
        notes: notes.to_string(),
    })
}

fn build_histogram(
    sample: &[Row],
    numeric_col: &str,
    max_points: usize,
    notes: &str,
) -> Option<ChartSpec> {
    let mut values: Vec<f64> = sample
        .iter()
        .filter_map(|row| cells::as_number(row.get(numeric_col)))
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut distinct = values.clone();
    distinct.dedup();
    let bins = 10usize.min(max_points).min(distinct.len().max(2));

    let (min, max) = (values[0], values[values.len() - 1]);
    let width = ((max - min) / bins as f64).max(f64::EPSILON);
    let mut counts = vec![0u64; bins];
    for v in &values {
        let mut b = ((v - min) / width) as usize;
        if b >= bins {
            b = bins - 1;
        }
        counts[b] += 1;
    }

    let labels: Vec<Value> = (0..bins)
        .map(|b| {
            let lo = min + b as f64 * width;
            let hi = min + (b + 1) as f64 * width;
            json!(format!("{lo:.2}-{hi:.2}"))
        })
        .collect();
    let y: Vec<Value> = counts.iter().map(|c| json!(c)).collect();

    Some(ChartSpec {
        title: format!("Distribution of {numeric_col}"),
        chart_type: ChartType::Histogram,
        x: Some(numeric_col.to_string()),
        y: None,
        aggregation: Some(Aggregation::Count),
        data_preview: BTreeMap::from([("x".to_string(), labels), ("y".to_string(), y)]),
        notes: notes.to_string(),
    })
}

fn build_line(
    sample: &[Row],
    datetime_col: &str,
    numeric_col: Option<&String>,
    max_points: usize,
    notes: &str,
) -> Option<ChartSpec> {
    if let Some(numeric_col) = numeric_col {
        let mut sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();
        for row in sample {
            let (Some(date), Some(v)) = (
                cells::as_date_bucket(row.get(datetime_col)),
                cells::as_number(row.get(numeric_col.as_str())),
            ) else {
                continue;
            };
            let e = sums.entry(date).or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }
        if sums.is_empty() {
            return None;
        }
        // Date-sorted already (BTreeMap); cap to the first max_points buckets.
        let x: Vec<Value> = sums.keys().take(max_points).map(|k| json!(k)).collect();
        let y: Vec<Value> = sums
            .values()
            .take(max_points)
            .map(|(sum, n)| json!(sum / *n as f64))
            .collect();
        return Some(ChartSpec {
            title: format!("Average {numeric_col} over time"),
            chart_type: ChartType::Line,
            x: Some(datetime_col.to_string()),
            y: Some(numeric_col.to_string()),
            aggregation: Some(Aggregation::Avg),
            data_preview: BTreeMap::from([("x".to_string(), x), ("y".to_string(), y)]),
            notes: notes.to_string(),
        });
    }

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for row in sample {
        if let Some(date) = cells::as_date_bucket(row.get(datetime_col)) {
            *counts.entry(date).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return None;
    }
    let x: Vec<Value> = counts.keys().take(max_points).map(|k| json!(k)).collect();
    let y: Vec<Value> = counts.values().take(max_points).map(|c| json!(c)).collect();
    Some(ChartSpec {
        title: format!("Count over time ({datetime_col})"),
        chart_type: ChartType::Line,
        x: Some(datetime_col.to_string()),
        y: None,
        aggregation: Some(Aggregation::Count),
        data_preview: BTreeMap::from([("x".to_string(), x), ("y".to_string(), y)]),
        notes: notes.to_string(),
    })
}

fn build_scatter(
    sample: &[Row],
    x_col: &str,
    y_col: &str,
    max_points: usize,
    notes: &str,
) -> Option<ChartSpec> {
    let points: Vec<(f64, f64)> = sample
        .iter()
        .filter_map(|row| {
            Some((
                cells::as_number(row.get(x_col))?,
                cells::as_number(row.get(y_col))?,
            ))
        })
        .take(max_points)
        .collect();
    if points.is_empty() {
        return None;
    }
    let x: Vec<Value> = points.iter().map(|(a, _)| json!(a)).collect();
    let y: Vec<Value> = points.iter().map(|(_, b)| json!(b)).collect();
    Some(ChartSpec {
        title: format!("{y_col} vs {x_col}"),
        chart_type: ChartType::Scatter,
        x: Some(x_col.to_string()),
        y: Some(y_col.to_string()),
        aggregation: None,
        data_preview: BTreeMap::from([("x".to_string(), x), ("y".to_string(), y)]),
        notes: notes.to_string(),
    })
}
