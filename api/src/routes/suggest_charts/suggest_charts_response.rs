use insights_engine::ChartSpec;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SuggestChartsResponse {
    pub message: String,
    pub charts: Vec<ChartSpec>,
}
