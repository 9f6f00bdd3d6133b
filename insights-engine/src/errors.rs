//! Unified error types for the crate.

use thiserror::Error;

use dataset_store::DatasetError;

/// Top-level error for insights operations.
#[derive(Debug, Error)]
pub enum InsightsError {
    /// Dataset lookup or row access failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Malformed caller parameters (zero sample, unknown target column, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid configuration values.
    #[error("config error: {0}")]
    Config(String),
}

impl InsightsError {
    /// Stable machine-readable kind, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            InsightsError::Dataset(DatasetError::NotFound(_)) => "NOT_FOUND",
            InsightsError::Dataset(_) => "INTERNAL",
            InsightsError::Validation(_) => "VALIDATION",
            InsightsError::Config(_) => "CONFIG",
        }
    }
}
