use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default)]
pub struct IndexDatasetRequest {
    /// Columns to render into documents; defaults to every column.
    pub columns: Option<Vec<String>>,
    /// Rows per document; falls back to configuration.
    pub rows_per_doc: Option<usize>,
    /// Row cap for this build; falls back to configuration.
    pub max_rows: Option<usize>,
    /// Drop the existing collection before building.
    #[serde(default)]
    pub reindex: bool,
}
