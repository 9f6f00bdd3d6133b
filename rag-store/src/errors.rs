//! Unified error types for the crate.

use thiserror::Error;

use dataset_store::DatasetError;
use llm_service::LlmError;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Dataset lookup or row access failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Malformed caller parameters (bad top_k, unknown doc_type, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Search or chat requested before any successful index build.
    #[error("dataset has not been indexed yet: {0}")]
    NotIndexed(String),

    /// A second concurrent index build was requested for the same dataset.
    #[error("index build already in progress for dataset: {0}")]
    IndexInProgress(String),

    /// Reindex attempted with an embedding model of a different vector size
    /// without an explicit clear.
    #[error("embedding dimension mismatch: got {got}, collection has {want}")]
    DimensionMismatch { got: usize, want: usize },

    /// Upstream call exceeded the bounded wait.
    #[error("upstream timed out: {0}")]
    UpstreamTimeout(String),

    /// Embedding/index/LLM failure that persisted after bounded retries.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}

impl RagError {
    /// Stable machine-readable kind, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            RagError::Dataset(DatasetError::NotFound(_)) => "NOT_FOUND",
            RagError::Dataset(_) | RagError::Io(_) | RagError::Parse(_) => "INTERNAL",
            RagError::Config(_) => "CONFIG",
            RagError::Validation(_) => "VALIDATION",
            RagError::NotIndexed(_) => "NOT_INDEXED",
            RagError::IndexInProgress(_) => "INDEX_IN_PROGRESS",
            RagError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            RagError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            RagError::UpstreamUnavailable(_) | RagError::Qdrant(_) => "UPSTREAM_UNAVAILABLE",
        }
    }
}

/// Maps an exhausted provider error onto the transport taxonomy.
///
/// Timeouts stay distinguishable so callers can decide between "retry later"
/// and "provider is down".
impl From<LlmError> for RagError {
    fn from(e: LlmError) -> Self {
        if e.is_timeout() {
            RagError::UpstreamTimeout(e.to_string())
        } else {
            RagError::UpstreamUnavailable(e.to_string())
        }
    }
}
