//! Response envelope shared by every route.
//!
//! Success bodies ride in `data`; failures carry a stable machine-readable
//! `code` (the same kinds the core crates expose, e.g. `NOT_INDEXED`) plus a
//! human-readable message. Exactly one of `data`/`error` is present.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Serialize)]
pub struct ApiError {
    /// Stable error code, e.g. `NOT_FOUND`, `VALIDATION`, `NOT_INDEXED`.
    pub code: &'static str,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_omits_the_error_field() {
        let body = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], 42);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn error_carries_code_and_message() {
        let body: ApiResponse<()> = ApiResponse::error("NOT_INDEXED", "index ds1 first");
        let body = serde_json::to_value(body).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_INDEXED");
        assert_eq!(body["error"]["message"], "index ds1 first");
        assert!(body.get("data").is_none());
    }
}
