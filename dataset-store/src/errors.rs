//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for dataset-store operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Unknown dataset id (no directory or metadata file).
    #[error("dataset not found: {0}")]
    NotFound(String),

    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata or row file exists but cannot be decoded.
    #[error("corrupted dataset file: {0}")]
    Corrupted(String),
}
