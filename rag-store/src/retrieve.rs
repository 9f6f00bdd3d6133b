//! Retrieval: embed the query, search the dataset collection, build citations.

use tracing::{debug, info};

use dataset_store::DatasetStore;

use crate::config::RagConfig;
use crate::documents::DocType;
use crate::embed::{Embedder, embed_all};
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::registry::read_marker;
use crate::retry::retry_transient;

/// One cited passage returned to the caller.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchHit {
    pub score: f32,
    pub text: String,
    pub doc_type: DocType,
    /// Row range covered by the passage (row documents only).
    pub row_start: Option<usize>,
    pub row_end: Option<usize>,
    /// Human-readable source label, e.g. `dataset:ds1 rows:0-49`.
    pub citation: String,
}

/// Searches one dataset's indexed documents.
///
/// # Errors
/// - [`RagError::Validation`] for an empty query, `top_k` of zero, or an
///   unknown doc type name.
/// - [`RagError::Dataset`] (`NotFound`) for an unknown dataset id.
/// - [`RagError::NotIndexed`] when the dataset was never indexed or its
///   collection is empty, distinct from transient upstream failures so
///   callers can tell "index first" from "retry".
pub async fn search_dataset(
    cfg: &RagConfig,
    datasets: &DatasetStore,
    index: &dyn VectorIndex,
    embedder: &dyn Embedder,
    dataset_id: &str,
    query: &str,
    top_k: u64,
    doc_types: &[DocType],
) -> Result<Vec<SearchHit>, RagError> {
    if query.trim().is_empty() {
        return Err(RagError::Validation("query must not be empty".into()));
    }
    if top_k == 0 {
        return Err(RagError::Validation("top_k must be > 0".into()));
    }

    let meta = datasets.load_meta(dataset_id)?;

    let dataset_dir = datasets.dataset_dir(&meta.dataset_id);
    if read_marker(&dataset_dir)?.is_none() {
        return Err(RagError::NotIndexed(dataset_id.to_string()));
    }

    let collection = cfg.collection_for(dataset_id);
    if index.count(&collection).await? == 0 {
        return Err(RagError::NotIndexed(dataset_id.to_string()));
    }

    let query_vec = embed_all(embedder, &[query.to_string()], 1, cfg.max_retries)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            RagError::UpstreamUnavailable("embedding provider returned no vectors".into())
        })?;

    let filter = normalize_doc_types(doc_types);
    let hits = retry_transient("index search", cfg.max_retries, || {
        index.search(&collection, query_vec.clone(), top_k, filter)
    })
    .await?;

    let out: Vec<SearchHit> = hits
        .into_iter()
        .map(|h| SearchHit {
            score: h.score,
            citation: format!("dataset:{dataset_id} {}", h.payload.excerpt()),
            doc_type: h.payload.doc_type,
            row_start: h.payload.row_start,
            row_end: h.payload.row_end,
            text: h.text,
        })
        .collect();

    info!(dataset_id, top_k, hits = out.len(), "search completed");
    Ok(out)
}

/// Collapses the requested doc-type list into an index-level filter.
///
/// Empty list or both kinds means no filter.
fn normalize_doc_types(doc_types: &[DocType]) -> Option<DocType> {
    match doc_types {
        [] => None,
        [single] => Some(*single),
        many => {
            let first = many[0];
            if many.iter().all(|t| *t == first) {
                Some(first)
            } else {
                debug!("doc_type filter covers all kinds, skipping");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_type_normalization() {
        assert_eq!(normalize_doc_types(&[]), None);
        assert_eq!(normalize_doc_types(&[DocType::Rows]), Some(DocType::Rows));
        assert_eq!(
            normalize_doc_types(&[DocType::Rows, DocType::Rows]),
            Some(DocType::Rows)
        );
        assert_eq!(normalize_doc_types(&[DocType::Rows, DocType::Summary]), None);
    }
}
