use insights_engine::InsightsReport;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub message: String,
    /// True when the report was served from cache.
    pub cached: bool,
    pub report: InsightsReport,
}
