use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use rag_store::DocType;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::search_dataset::{
        search_dataset_request::SearchDatasetRequest,
        search_dataset_response::SearchDatasetResponse,
    },
};

const DEFAULT_TOP_K: u64 = 5;

pub async fn search_dataset_route(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
    Json(p): Json<SearchDatasetRequest>,
) -> AppResult<Response> {
    debug!(
        dataset_id = %dataset_id,
        query = %p.query,
        "search_dataset_route: start"
    );

    let doc_types: Vec<DocType> = p
        .doc_types
        .iter()
        .map(|s| DocType::parse(s))
        .collect::<Result<_, _>>()?;
    let top_k = p.top_k.unwrap_or(DEFAULT_TOP_K);

    let results = state
        .rag
        .search(&dataset_id, &p.query, top_k, &doc_types)
        .await?;

    debug!(
        dataset_id = %dataset_id,
        hits = results.len(),
        "search_dataset_route: success"
    );

    let body = SearchDatasetResponse {
        message: "Search completed successfully".to_string(),
        query: p.query,
        results,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
