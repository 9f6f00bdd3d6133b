use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct ChatRequest {
    pub dataset_id: String,
    pub message: String,
    /// Passages retrieved for grounding, default 5.
    pub top_k: Option<u64>,
    /// Restrict grounding to document kinds ("summary", "rows").
    #[serde(default)]
    pub doc_types: Vec<String>,
    /// "plain" (default) or "markdown".
    pub response_format: Option<String>,
}
