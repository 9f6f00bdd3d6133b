use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::Response};
use chat_service::{ChatParams, ResponseFormat};
use rag_store::DocType;
use tracing::debug;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    routes::chat::{chat_request::ChatRequest, chat_response::ChatResponse},
};

pub async fn chat_route(
    State(state): State<Arc<AppState>>,
    Json(p): Json<ChatRequest>,
) -> AppResult<Response> {
    debug!(
        dataset_id = %p.dataset_id,
        "chat_route: start"
    );

    let doc_types: Vec<DocType> = p
        .doc_types
        .iter()
        .map(|s| DocType::parse(s))
        .collect::<Result<_, _>>()?;
    let response_format = match p.response_format.as_deref() {
        Some(s) => ResponseFormat::parse(s)?,
        None => ResponseFormat::default(),
    };

    let defaults = ChatParams::default();
    let params = ChatParams {
        top_k: p.top_k.unwrap_or(defaults.top_k),
        doc_types,
        response_format,
    };
    let outcome = state.chat.chat(&p.dataset_id, &p.message, &params).await?;

    debug!(
        dataset_id = %p.dataset_id,
        citations = outcome.citations.len(),
        latency_ms = outcome.latency_ms,
        "chat_route: success"
    );

    let body = ChatResponse {
        message: "Chat completed successfully".to_string(),
        outcome,
    };
    Ok(ApiResponse::success(body).into_response_with_status(StatusCode::OK))
}
