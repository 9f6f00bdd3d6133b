use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use insights_engine::ChartParams;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::suggest_charts::{
        suggest_charts_request::SuggestChartsRequest,
        suggest_charts_response::SuggestChartsResponse,
    },
};

pub async fn suggest_charts_route(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
    Json(p): Json<SuggestChartsRequest>,
) -> AppResult<Response> {
    debug!(dataset_id = %dataset_id, "suggest_charts_route: start");

    let defaults = ChartParams::default();
    let params = ChartParams {
        question: p.question,
        max_charts: p.max_charts.unwrap_or(defaults.max_charts),
    };
    let charts = state.insights.suggest_charts(&dataset_id, &params).await?;

    debug!(
        dataset_id = %dataset_id,
        charts = charts.len(),
        "suggest_charts_route: success"
    );

    let body = SuggestChartsResponse {
        message: "Chart suggestions built successfully".to_string(),
        charts,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
