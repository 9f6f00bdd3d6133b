//! Bounded retry for transient upstream failures.
//!
//! Both the embedding provider and the vector index sit behind the same
//! policy: a transient failure is retried with exponential backoff up to a
//! bounded attempt count, everything else surfaces immediately. Retried
//! operations must be idempotent (embedding a batch, upserting by doc id,
//! searching).

use std::time::Duration;

use tracing::warn;

use crate::errors::RagError;

fn is_transient(e: &RagError) -> bool {
    matches!(
        e,
        RagError::UpstreamUnavailable(_) | RagError::UpstreamTimeout(_) | RagError::Qdrant(_)
    )
}

/// Runs `op` up to `max_retries` attempts (at least one).
pub(crate) async fn retry_transient<T, F, Fut>(
    what: &str,
    max_retries: usize,
    mut op: F,
) -> Result<T, RagError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RagError>>,
{
    let attempts = max_retries.max(1);
    let mut last_err: Option<RagError> = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            let backoff = Duration::from_millis(200 * (1u64 << (attempt - 1).min(4)));
            tokio::time::sleep(backoff).await;
        }
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if is_transient(&e) => {
                warn!(
                    what,
                    attempt = attempt + 1,
                    attempts,
                    error = %e,
                    "transient upstream failure, will retry"
                );
                last_err = Some(e);
            }
            // Validation and dimension errors never resolve by retrying.
            Err(e) => return Err(e),
        }
    }

    Err(last_err.unwrap_or_else(|| RagError::UpstreamUnavailable(format!("{what} failed"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let calls = AtomicUsize::new(0);
        let out = retry_transient("op", 3, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(RagError::Qdrant("connection reset".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(out, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_transient_errors_surface_immediately() {
        let calls = AtomicUsize::new(0);
        let err = retry_transient("op", 3, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(RagError::Validation("bad".into())) }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, RagError::Validation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_attempts_surface_the_last_failure() {
        let err = retry_transient("op", 2, || async {
            Err::<(), _>(RagError::UpstreamTimeout("slow".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, RagError::UpstreamTimeout(_)));
    }
}
