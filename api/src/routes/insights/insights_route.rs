use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use insights_engine::InsightsParams;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::insights::{insights_request::InsightsRequest, insights_response::InsightsResponse},
};

pub async fn insights_route(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
    Json(p): Json<InsightsRequest>,
) -> AppResult<Response> {
    debug!(
        dataset_id = %dataset_id,
        force_recompute = p.force_recompute,
        "insights_route: start"
    );

    let params = InsightsParams {
        sample_rows: p.sample_rows,
        target_column: p.target_column,
        force_recompute: p.force_recompute,
    };
    let outcome = state.insights.compute_insights(&dataset_id, &params).await?;

    debug!(
        dataset_id = %dataset_id,
        cached = outcome.cached,
        "insights_route: success"
    );

    let body = InsightsResponse {
        message: "Insights computed successfully".to_string(),
        cached: outcome.cached,
        report: (*outcome.report).clone(),
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
