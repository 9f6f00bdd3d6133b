//! Unified error types for the crate.

use thiserror::Error;

use insights_engine::InsightsError;
use llm_service::LlmError;

/// Top-level error for report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Insights or chart computation failed.
    #[error(transparent)]
    Insights(#[from] InsightsError),

    /// Report drafting failed at the LLM boundary.
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// Persisting `report.md` failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Prompt payload serialization failed.
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    /// Stable machine-readable kind, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::Insights(e) => e.kind(),
            ReportError::Llm(e) if e.is_timeout() => "UPSTREAM_TIMEOUT",
            ReportError::Llm(_) => "UPSTREAM_UNAVAILABLE",
            ReportError::Io(_) | ReportError::Serialize(_) => "INTERNAL",
        }
    }
}
