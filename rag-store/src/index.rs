//! Vector index seam: trait plus an in-process implementation.
//!
//! The Qdrant-backed implementation lives in `qdrant_facade`; the in-memory
//! one here serves local runs and tests. Both share the same semantics:
//! upsert is idempotent by doc id, searching an absent or empty collection
//! returns no hits, and result order is score-descending with build order
//! (`ordinal`) as the tie-breaker.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::documents::{DocPayload, DocType};
use crate::errors::RagError;

/// One vector plus everything needed to cite it back.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub doc_id: Uuid,
    pub vector: Vec<f32>,
    pub text: String,
    pub payload: DocPayload,
}

/// One ranked search result.
#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub score: f32,
    pub text: String,
    pub payload: DocPayload,
}

/// Storage backend for per-dataset vector collections.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Vector dimension of an existing collection, `None` if absent.
    async fn collection_dim(&self, collection: &str) -> Result<Option<usize>, RagError>;

    /// Creates the collection if missing; no-op when it already exists.
    async fn ensure_collection(&self, collection: &str, dim: usize) -> Result<(), RagError>;

    /// Drops the collection and all its entries.
    async fn clear(&self, collection: &str) -> Result<(), RagError>;

    /// Inserts or replaces entries by doc id. Returns the number written.
    async fn upsert(&self, collection: &str, entries: Vec<IndexEntry>) -> Result<u64, RagError>;

    /// Number of entries in the collection (0 if absent).
    async fn count(&self, collection: &str) -> Result<u64, RagError>;

    /// Top-k similarity search, optionally filtered by document type.
    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        top_k: u64,
        doc_type: Option<DocType>,
    ) -> Result<Vec<ScoredHit>, RagError>;
}

/* ------------------------------------------------------------------------- */
/* In-memory implementation                                                  */
/* ------------------------------------------------------------------------- */

struct MemCollection {
    dim: usize,
    entries: BTreeMap<Uuid, IndexEntry>,
}

/// Cosine-similarity index held in process memory.
#[derive(Default)]
pub struct MemoryIndex {
    collections: RwLock<HashMap<String, MemCollection>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn collection_dim(&self, collection: &str) -> Result<Option<usize>, RagError> {
        Ok(self.collections.read().await.get(collection).map(|c| c.dim))
    }

    async fn ensure_collection(&self, collection: &str, dim: usize) -> Result<(), RagError> {
        let mut cols = self.collections.write().await;
        cols.entry(collection.to_string())
            .or_insert_with(|| MemCollection {
                dim,
                entries: BTreeMap::new(),
            });
        Ok(())
    }

    async fn clear(&self, collection: &str) -> Result<(), RagError> {
        self.collections.write().await.remove(collection);
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: Vec<IndexEntry>) -> Result<u64, RagError> {
        let mut cols = self.collections.write().await;
        let col = cols
            .get_mut(collection)
            .ok_or_else(|| RagError::Qdrant(format!("collection not found: {collection}")))?;

        let mut written = 0u64;
        for e in entries {
            if e.vector.len() != col.dim {
                return Err(RagError::DimensionMismatch {
                    got: e.vector.len(),
                    want: col.dim,
                });
            }
            col.entries.insert(e.doc_id, e);
            written += 1;
        }
        Ok(written)
    }

    async fn count(&self, collection: &str) -> Result<u64, RagError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|c| c.entries.len() as u64)
            .unwrap_or(0))
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        top_k: u64,
        doc_type: Option<DocType>,
    ) -> Result<Vec<ScoredHit>, RagError> {
        if top_k == 0 {
            return Err(RagError::Validation("top_k must be > 0".into()));
        }

        let cols = self.collections.read().await;
        let Some(col) = cols.get(collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<ScoredHit> = col
            .entries
            .values()
            .filter(|e| doc_type.is_none_or(|t| e.payload.doc_type == t))
            .map(|e| ScoredHit {
                score: cosine(&vector, &e.vector),
                text: e.text.clone(),
                payload: e.payload.clone(),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.payload.ordinal.cmp(&b.payload.ordinal))
        });
        hits.truncate(top_k as usize);
        Ok(hits)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}
