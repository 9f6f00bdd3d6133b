use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default)]
pub struct SuggestChartsRequest {
    /// Free-text question steering the first suggestion.
    pub question: Option<String>,
    /// Maximum number of charts, default 3.
    pub max_charts: Option<usize>,
}
