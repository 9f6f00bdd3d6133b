//! Runtime and collection configuration.

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
}

/// Configuration for dataset indexing and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Prefix for per-dataset collections (`<prefix>_<dataset_id>`).
    pub collection_prefix: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Rows rendered into one row document.
    pub rows_per_doc: usize,
    /// Hard cap on rows read for indexing.
    pub max_rows_to_index: usize,
    /// Documents per embedding request.
    pub embed_batch_size: usize,
    /// Character budget per document text; oversized batches are split.
    pub doc_char_budget: usize,
    /// Bounded retries for transient embedding/search failures.
    pub max_retries: usize,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Root of the dataset storage directory.
    pub storage_dir: String,
}

impl RagConfig {
    /// Loads configuration from environment variables, with defaults matching
    /// typical local development.
    ///
    /// # Env
    /// - `QDRANT_URL` (default `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `RAG_COLLECTION_PREFIX` (default `dataset`)
    /// - `RAG_ROWS_PER_DOC` (default 50)
    /// - `RAG_MAX_ROWS_TO_INDEX` (default 5000)
    /// - `RAG_EMBED_BATCH_SIZE` (default 32)
    /// - `RAG_DOC_CHAR_BUDGET` (default 6000)
    /// - `RAG_MAX_RETRIES` (default 3)
    /// - `RAG_UPSERT_BATCH` (default 256)
    /// - `STORAGE_DIR` (default `data/datasets`)
    ///
    /// # Errors
    /// Returns [`RagError::Config`] when a numeric variable fails to parse
    /// or a value is out of range.
    pub fn from_env() -> Result<Self, RagError> {
        let cfg = Self {
            qdrant_url: env_or("QDRANT_URL", "http://localhost:6334"),
            qdrant_api_key: std::env::var("QDRANT_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            collection_prefix: env_or("RAG_COLLECTION_PREFIX", "dataset"),
            distance: DistanceKind::Cosine,
            rows_per_doc: env_usize("RAG_ROWS_PER_DOC", 50)?,
            max_rows_to_index: env_usize("RAG_MAX_ROWS_TO_INDEX", 5000)?,
            embed_batch_size: env_usize("RAG_EMBED_BATCH_SIZE", 32)?,
            doc_char_budget: env_usize("RAG_DOC_CHAR_BUDGET", 6000)?,
            max_retries: env_usize("RAG_MAX_RETRIES", 3)?,
            upsert_batch: env_usize("RAG_UPSERT_BATCH", 256)?,
            storage_dir: env_or("STORAGE_DIR", "data/datasets"),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Creates a sane default config for a given Qdrant endpoint and storage root.
    pub fn new_default(url: impl Into<String>, storage_dir: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection_prefix: "dataset".into(),
            distance: DistanceKind::Cosine,
            rows_per_doc: 50,
            max_rows_to_index: 5000,
            embed_batch_size: 32,
            doc_char_budget: 6000,
            max_retries: 3,
            upsert_batch: 256,
            storage_dir: storage_dir.into(),
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection_prefix.trim().is_empty() {
            return Err(RagError::Config("collection_prefix is empty".into()));
        }
        if self.rows_per_doc == 0 {
            return Err(RagError::Config("rows_per_doc must be > 0".into()));
        }
        if self.embed_batch_size == 0 {
            return Err(RagError::Config("embed_batch_size must be > 0".into()));
        }
        if self.doc_char_budget == 0 {
            return Err(RagError::Config("doc_char_budget must be > 0".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        Ok(())
    }

    /// Qdrant collection name for one dataset.
    pub fn collection_for(&self, dataset_id: &str) -> String {
        format!("{}_{}", self.collection_prefix, dataset_id)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_usize(name: &'static str, default: usize) -> Result<usize, RagError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v
            .parse::<usize>()
            .map_err(|_| RagError::Config(format!("{name}: expected usize"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_is_prefixed() {
        let mut cfg = RagConfig::new_default("http://localhost:6334", "data/datasets");
        assert_eq!(cfg.collection_for("abc"), "dataset_abc");
        assert!(cfg.validate().is_ok());

        cfg.rows_per_doc = 0;
        assert!(matches!(cfg.validate(), Err(RagError::Config(_))));
    }
}
