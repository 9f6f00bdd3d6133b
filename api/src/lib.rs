//! HTTP surface: axum routes over the dataset analytics core.

use std::env;
use std::sync::Arc;

mod core;
mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::info;

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use crate::routes::{
    chat::chat_route::chat_route, generate_report::generate_report_route::generate_report_route,
    health_route::health_route, index_dataset::index_dataset_route::index_dataset_route,
    insights::insights_route::insights_route,
    search_dataset::search_dataset_route::search_dataset_route,
    suggest_charts::suggest_charts_route::suggest_charts_route,
};

/// Binds the listener and serves until Ctrl+C.
///
/// # Errors
/// Returns [`AppError`] on missing configuration, bind failure, or a server
/// error while running.
pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").map_err(|_| AppError::MissingEnv("API_ADDRESS"))?;

    let state = Arc::new(AppState::from_env()?);

    let app = Router::new()
        .route("/health", get(health_route))
        .route("/datasets/{dataset_id}/index", post(index_dataset_route))
        .route("/datasets/{dataset_id}/search", post(search_dataset_route))
        .route("/datasets/{dataset_id}/insights", post(insights_route))
        .route(
            "/datasets/{dataset_id}/charts/suggest",
            post(suggest_charts_route),
        )
        .route("/datasets/{dataset_id}/report", post(generate_report_route))
        .route("/chat", post(chat_route))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "api listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
