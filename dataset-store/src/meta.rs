//! Dataset metadata as persisted by the upload pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::ColumnType;

/// Aggregate stats for one numeric column, computed at upload time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericOverview {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// One frequent value of a categorical column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopValue {
    pub value: String,
    pub count: u64,
}

/// Persisted description of one uploaded dataset (`metadata.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub dataset_id: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub nb_rows: u64,
    pub nb_columns: u64,
    /// Column names in original file order.
    pub columns: Vec<String>,
    #[serde(default)]
    pub column_types: BTreeMap<String, ColumnType>,
    #[serde(default)]
    pub numeric_summary: BTreeMap<String, NumericOverview>,
    #[serde(default)]
    pub top_values: BTreeMap<String, Vec<TopValue>>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl DatasetMeta {
    /// Human-readable schema line, `name (type)` comma-joined, used by the
    /// summary document and the chat prompt.
    pub fn schema_line(&self) -> String {
        self.schema_line_for(&self.columns)
    }

    /// Schema line restricted to a column selection, in the given order.
    pub fn schema_line_for(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| match self.column_types.get(c) {
                Some(t) => format!("{c} ({t})"),
                None => c.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_line_includes_types_when_known() {
        let mut column_types = BTreeMap::new();
        column_types.insert("age".to_string(), ColumnType::Numeric);
        let meta = DatasetMeta {
            dataset_id: "ds1".into(),
            filename: "people.csv".into(),
            created_at: Utc::now(),
            nb_rows: 2,
            nb_columns: 2,
            columns: vec!["name".into(), "age".into()],
            column_types,
            numeric_summary: BTreeMap::new(),
            top_values: BTreeMap::new(),
            warnings: vec![],
        };
        assert_eq!(meta.schema_line(), "name, age (numeric)");
    }
}
