//! Chat orchestration errors.

use llm_service::LlmError;
use rag_store::RagError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Retrieval or index-state failure.
    #[error(transparent)]
    Rag(#[from] RagError),

    /// Completion provider failure.
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    #[error("validation: {0}")]
    Validation(String),
}

impl ChatError {
    /// Stable error code for HTTP mapping and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Rag(e) => e.kind(),
            ChatError::Llm(e) if e.is_timeout() => "UPSTREAM_TIMEOUT",
            ChatError::Llm(_) => "UPSTREAM_UNAVAILABLE",
            ChatError::Validation(_) => "VALIDATION",
        }
    }
}
