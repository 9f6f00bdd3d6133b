//! Embedding boundary: provider trait plus ordered, retried batching.
//!
//! The provider receives a non-empty ordered batch and must return
//! equal-length ordered vectors of one fixed dimension; any element error
//! fails the whole batch. This module owns splitting the full document list
//! into batches, preserving order, and retrying a failed batch with the same
//! content up to a bounded attempt count.

pub mod llm;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::RagError;
use crate::retry::retry_transient;

/// Provider interface for embedding generation.
///
/// Implement this trait to plug in another backend (local model, test stub).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds an ordered batch of texts into equal-length vectors.
    ///
    /// # Errors
    /// Fails the entire batch on any element error; no partial batches.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Model identifier, recorded in the index marker.
    fn model_name(&self) -> &str;
}

/// Embeds all texts in order, `batch_size` at a time, with bounded retries
/// per batch.
///
/// Returns one vector per input text, in input order. Every vector must have
/// the same dimension as the first one returned.
///
/// # Errors
/// - [`RagError::Validation`] if `batch_size` is zero.
/// - [`RagError::UpstreamUnavailable`] / [`RagError::UpstreamTimeout`] when a
///   batch keeps failing after `max_retries` attempts.
pub async fn embed_all(
    provider: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
    max_retries: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    if batch_size == 0 {
        return Err(RagError::Validation("embed batch_size must be > 0".into()));
    }
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let mut out: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
    let mut dim: Option<usize> = None;

    for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
        let vectors = embed_batch_with_retry(provider, batch, batch_no, max_retries).await?;

        if vectors.len() != batch.len() {
            return Err(RagError::UpstreamUnavailable(format!(
                "embedding batch {batch_no}: sent {} texts, got {} vectors",
                batch.len(),
                vectors.len()
            )));
        }
        for v in &vectors {
            match dim {
                None => dim = Some(v.len()),
                Some(d) if v.len() != d => {
                    return Err(RagError::DimensionMismatch {
                        got: v.len(),
                        want: d,
                    });
                }
                Some(_) => {}
            }
        }
        out.extend(vectors);
    }

    debug!(texts = texts.len(), dim = dim.unwrap_or(0), "embedded all texts");
    Ok(out)
}

/// Retries one batch with identical content and exponential backoff.
async fn embed_batch_with_retry(
    provider: &dyn Embedder,
    batch: &[String],
    batch_no: usize,
    max_retries: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    retry_transient(&format!("embedding batch {batch_no}"), max_retries, || {
        provider.embed_batch(batch)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `fail_first` calls, then returns unit vectors.
    struct FlakyEmbedder {
        fail_first: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for FlakyEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                return Err(RagError::UpstreamUnavailable("boom".into()));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn model_name(&self) -> &str {
            "flaky-test"
        }
    }

    #[tokio::test]
    async fn retries_transient_failures_then_succeeds() {
        let p = FlakyEmbedder {
            fail_first: 2,
            calls: AtomicUsize::new(0),
        };
        let texts: Vec<String> = (0..3).map(|i| format!("t{i}")).collect();
        let vectors = embed_all(&p, &texts, 2, 3).await.unwrap();
        assert_eq!(vectors.len(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_the_failure() {
        let p = FlakyEmbedder {
            fail_first: 10,
            calls: AtomicUsize::new(0),
        };
        let texts = vec!["a".to_string()];
        let err = embed_all(&p, &texts, 2, 2).await.unwrap_err();
        assert!(matches!(err, RagError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_input_is_empty_output() {
        let p = FlakyEmbedder {
            fail_first: 0,
            calls: AtomicUsize::new(0),
        };
        assert!(embed_all(&p, &[], 8, 3).await.unwrap().is_empty());
    }
}
