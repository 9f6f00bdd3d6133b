use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use rag_store::IndexParams;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::index_dataset::{
        index_dataset_request::IndexDatasetRequest, index_dataset_response::IndexDatasetResponse,
    },
};

pub async fn index_dataset_route(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
    Json(p): Json<IndexDatasetRequest>,
) -> AppResult<Response> {
    debug!(
        dataset_id = %dataset_id,
        reindex = p.reindex,
        "index_dataset_route: start"
    );

    let params = IndexParams {
        columns: p.columns,
        rows_per_doc: p.rows_per_doc,
        max_rows: p.max_rows,
        reindex: p.reindex,
    };
    let report = state.rag.index_dataset(&dataset_id, &params).await?;

    debug!(
        dataset_id = %dataset_id,
        nb_docs = report.nb_docs,
        "index_dataset_route: success"
    );

    let body = IndexDatasetResponse {
        message: "Dataset indexed successfully".to_string(),
        report,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
