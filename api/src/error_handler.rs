use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use chat_service::ChatError;
use insights_engine::InsightsError;
use rag_store::RagError;
use report_service::ReportError;

use crate::core::{app_state::ConfigError, http::response_envelope::ApiResponse};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingEnv(_) => StatusCode::INTERNAL_SERVER_ERROR, // startup-only
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,     // startup-only
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,

            // custom mapped
            AppError::Http { status, .. } => *status,

            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let resp: ApiResponse<()> = ApiResponse::error(self.error_code(), self.to_string());
        resp.into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Convert common Axum rejections to `AppError`.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// HTTP status for a stable error kind shared by the core crates.
fn status_for(kind: &str) -> StatusCode {
    match kind {
        "NOT_FOUND" => StatusCode::NOT_FOUND,
        "VALIDATION" | "NOT_INDEXED" | "DIMENSION_MISMATCH" => StatusCode::BAD_REQUEST,
        "INDEX_IN_PROGRESS" => StatusCode::CONFLICT,
        "UPSTREAM_TIMEOUT" => StatusCode::GATEWAY_TIMEOUT,
        "UPSTREAM_UNAVAILABLE" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn http_from_kind(kind: &'static str, message: String) -> AppError {
    AppError::Http {
        status: status_for(kind),
        code: kind,
        message,
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        http_from_kind(err.kind(), err.to_string())
    }
}

impl From<InsightsError> for AppError {
    fn from(err: InsightsError) -> Self {
        http_from_kind(err.kind(), err.to_string())
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        http_from_kind(err.kind(), err.to_string())
    }
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        http_from_kind(err.kind(), err.to_string())
    }
}
