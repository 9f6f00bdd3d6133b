//! High-level RAG facade over datasets: indexing + cited retrieval.
//!
//! This crate provides a clean API to:
//! - Build retrievable documents from a dataset (one summary + row batches)
//! - Embed them in ordered batches with bounded retries
//! - Upsert into a per-dataset vector collection (Qdrant or in-memory)
//! - Answer semantic queries with ranked, cited passages
//!
//! The design is flat (no deep nesting) and splits responsibilities into
//! focused modules.

mod config;
mod documents;
mod embed;
mod errors;
mod ids;
mod index;
mod ingest;
mod qdrant_facade;
mod registry;
mod retrieve;
mod retry;

pub use config::{DistanceKind, RagConfig};
pub use documents::{DocPayload, DocType, RagDocument, build_documents};
pub use embed::{Embedder, llm::LlmEmbedder};
pub use errors::RagError;
pub use index::{IndexEntry, MemoryIndex, ScoredHit, VectorIndex};
pub use ingest::{IndexParams, IndexReport};
pub use qdrant_facade::QdrantIndex;
pub use registry::{DatasetRegistry, IndexMarker, read_marker};
pub use retrieve::SearchHit;

use std::sync::Arc;
use tracing::trace;

use dataset_store::DatasetStore;

/// High-level facade that wires configuration, storage, embeddings, and the
/// vector index.
///
/// This is the single entry point recommended for application code.
pub struct RagStore {
    cfg: RagConfig,
    datasets: DatasetStore,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    registry: DatasetRegistry,
}

impl RagStore {
    /// Constructs a new store from the given configuration and collaborators.
    ///
    /// # Errors
    /// Returns `RagError::Config` if the configuration is invalid.
    pub fn new(
        cfg: RagConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, RagError> {
        cfg.validate()?;
        let datasets = DatasetStore::new(cfg.storage_dir.clone());
        Ok(Self {
            cfg,
            datasets,
            index,
            embedder,
            registry: DatasetRegistry::new(),
        })
    }

    /// Constructs a Qdrant-backed store from environment configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` on invalid environment values or client
    /// initialization failure.
    pub fn from_env(embedder: Arc<dyn Embedder>) -> Result<Self, RagError> {
        let cfg = RagConfig::from_env()?;
        let index: Arc<dyn VectorIndex> = Arc::new(QdrantIndex::new(&cfg)?);
        Self::new(cfg, index, embedder)
    }

    /// Builds (or rebuilds) the vector index for one dataset.
    ///
    /// # Errors
    /// See [`ingest::index_dataset`].
    pub async fn index_dataset(
        &self,
        dataset_id: &str,
        params: &IndexParams,
    ) -> Result<IndexReport, RagError> {
        trace!("RagStore::index_dataset dataset_id={dataset_id}");
        ingest::index_dataset(
            &self.cfg,
            &self.datasets,
            self.index.as_ref(),
            self.embedder.as_ref(),
            &self.registry,
            dataset_id,
            params,
        )
        .await
    }

    /// Searches one dataset and returns ranked, cited passages.
    ///
    /// # Errors
    /// See [`retrieve::search_dataset`].
    pub async fn search(
        &self,
        dataset_id: &str,
        query: &str,
        top_k: u64,
        doc_types: &[DocType],
    ) -> Result<Vec<SearchHit>, RagError> {
        trace!("RagStore::search dataset_id={dataset_id} top_k={top_k}");
        retrieve::search_dataset(
            &self.cfg,
            &self.datasets,
            self.index.as_ref(),
            self.embedder.as_ref(),
            dataset_id,
            query,
            top_k,
            doc_types,
        )
        .await
    }

    /// Read access to the shared dataset store.
    pub fn datasets(&self) -> &DatasetStore {
        &self.datasets
    }

    /// Active configuration.
    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }
}
