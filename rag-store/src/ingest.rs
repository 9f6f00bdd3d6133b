//! End-to-end indexing pipeline: read rows → build documents → embed →
//! upsert into the vector index → persist the marker.
//!
//! The build is all-or-nothing: a failed embedding batch aborts the whole
//! run and the marker is only written after every vector has been upserted,
//! so a partially embedded dataset never reads as indexed.

use std::time::Instant;

use tracing::{info, warn};

use dataset_store::DatasetStore;

use crate::config::RagConfig;
use crate::documents::build_documents;
use crate::embed::{Embedder, embed_all};
use crate::errors::RagError;
use crate::index::{IndexEntry, VectorIndex};
use crate::registry::{DatasetRegistry, IndexMarker, remove_marker, write_marker};
use crate::retry::retry_transient;

/// Caller-tunable knobs for one index build.
#[derive(Debug, Clone, Default)]
pub struct IndexParams {
    /// Columns to render into documents; defaults to every column.
    pub columns: Option<Vec<String>>,
    /// Override for `RagConfig::rows_per_doc`.
    pub rows_per_doc: Option<usize>,
    /// Override for `RagConfig::max_rows_to_index`.
    pub max_rows: Option<usize>,
    /// Drop the existing collection before building.
    pub reindex: bool,
}

/// Summary of a completed index build.
#[derive(Debug, Clone, serde::Serialize)]
pub struct IndexReport {
    pub dataset_id: String,
    pub nb_docs: usize,
    pub vectors_upserted: u64,
    pub embedding_model: String,
    pub dim: usize,
    pub duration_ms: u128,
}

/// Builds (or rebuilds) the vector index for one dataset.
///
/// # Errors
/// - [`RagError::Validation`] for out-of-range parameters, an unknown column
///   selection, or an empty dataset.
/// - [`RagError::Dataset`] (`NotFound`) for an unknown dataset id.
/// - [`RagError::IndexInProgress`] if another build holds the dataset slot.
/// - [`RagError::DimensionMismatch`] when the embedding dimension differs
///   from the existing collection and `reindex` was not requested.
/// - Upstream errors after bounded retries.
pub async fn index_dataset(
    cfg: &RagConfig,
    datasets: &DatasetStore,
    index: &dyn VectorIndex,
    embedder: &dyn Embedder,
    registry: &DatasetRegistry,
    dataset_id: &str,
    params: &IndexParams,
) -> Result<IndexReport, RagError> {
    let started = Instant::now();

    let rows_per_doc = params.rows_per_doc.unwrap_or(cfg.rows_per_doc);
    let max_rows = params.max_rows.unwrap_or(cfg.max_rows_to_index);
    if rows_per_doc == 0 {
        return Err(RagError::Validation("rows_per_doc must be > 0".into()));
    }
    if max_rows == 0 {
        return Err(RagError::Validation("max_rows must be > 0".into()));
    }

    let meta = datasets.load_meta(dataset_id)?;

    let columns = match &params.columns {
        Some(requested) => {
            for col in requested {
                if !meta.columns.contains(col) {
                    return Err(RagError::Validation(format!("unknown column: {col}")));
                }
            }
            requested.as_slice()
        }
        None => meta.columns.as_slice(),
    };

    // Single in-flight build per dataset; held until this function returns.
    let _guard = registry.try_begin_index(dataset_id)?;

    let rows = datasets.read_rows(dataset_id, Some(max_rows))?;
    let docs = build_documents(
        &meta,
        &rows,
        columns,
        rows_per_doc,
        max_rows,
        cfg.doc_char_budget,
    )?;

    let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
    let vectors = embed_all(embedder, &texts, cfg.embed_batch_size, cfg.max_retries).await?;
    let dim = vectors.first().map(|v| v.len()).ok_or_else(|| {
        RagError::UpstreamUnavailable("embedding provider returned no vectors".into())
    })?;

    let collection = cfg.collection_for(dataset_id);
    let dataset_dir = datasets.dataset_dir(dataset_id);

    if params.reindex {
        warn!(dataset_id, "reindex requested, dropping existing collection");
        index.clear(&collection).await?;
        remove_marker(&dataset_dir)?;
    } else if let Some(want) = index.collection_dim(&collection).await? {
        if want != dim {
            return Err(RagError::DimensionMismatch { got: dim, want });
        }
    }

    index.ensure_collection(&collection, dim).await?;

    let entries: Vec<IndexEntry> = docs
        .iter()
        .zip(vectors)
        .map(|(d, vector)| IndexEntry {
            doc_id: d.doc_id,
            vector,
            text: d.text.clone(),
            payload: d.payload.clone(),
        })
        .collect();

    // Upsert is idempotent by doc id; a retried chunk cannot duplicate.
    let mut upserted = 0u64;
    for chunk in entries.chunks(cfg.upsert_batch.max(1)) {
        upserted += retry_transient("index upsert", cfg.max_retries, || {
            index.upsert(&collection, chunk.to_vec())
        })
        .await?;
    }

    let marker = IndexMarker {
        embedding_model: embedder.model_name().to_string(),
        dim,
        nb_docs: docs.len(),
        indexed_at: chrono::Utc::now(),
    };
    write_marker(&dataset_dir, &marker)?;

    let report = IndexReport {
        dataset_id: dataset_id.to_string(),
        nb_docs: docs.len(),
        vectors_upserted: upserted,
        embedding_model: marker.embedding_model.clone(),
        dim,
        duration_ms: started.elapsed().as_millis(),
    };

    info!(
        dataset_id,
        nb_docs = report.nb_docs,
        vectors = report.vectors_upserted,
        dim,
        latency_ms = report.duration_ms,
        "index build completed"
    );
    Ok(report)
}
