use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default)]
pub struct InsightsRequest {
    /// Sample size; clamped to the configured maximum.
    pub sample_rows: Option<usize>,
    /// Column the analysis should focus on.
    pub target_column: Option<String>,
    /// Skip the cache and overwrite the entry.
    #[serde(default)]
    pub force_recompute: bool,
}
