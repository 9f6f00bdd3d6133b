use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct SearchDatasetRequest {
    pub query: String,
    /// Result count cap, default 5.
    pub top_k: Option<u64>,
    /// Restrict to document kinds ("summary", "rows"); empty means all.
    #[serde(default)]
    pub doc_types: Vec<String>,
}
