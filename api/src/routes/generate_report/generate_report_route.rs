use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::generate_report::generate_report_response::GenerateReportResponse,
};

pub async fn generate_report_route(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
) -> AppResult<Response> {
    debug!(dataset_id = %dataset_id, "generate_report_route: start");

    let outcome = state.report.generate(&dataset_id).await?;

    debug!(
        dataset_id = %dataset_id,
        used_llm = outcome.used_llm,
        "generate_report_route: success"
    );

    let body = GenerateReportResponse {
        message: "Report generated successfully".to_string(),
        outcome,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
