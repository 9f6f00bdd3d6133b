//! In-memory report cache with per-key coalescing.
//!
//! Concurrent requests for the same key share one computation: the first
//! caller holds the slot lock while computing, later callers wait on it and
//! read the stored report instead of recomputing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::InsightsError;
use crate::models::InsightsReport;

/// Exact-match cache key. Any difference in sampling or target column is a
/// different entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub dataset_id: String,
    pub sample_rows: usize,
    pub target_column: Option<String>,
}

type Slot = Arc<Mutex<Option<Arc<InsightsReport>>>>;

#[derive(Default)]
pub struct InsightsCache {
    slots: StdMutex<HashMap<CacheKey, Slot>>,
}

impl InsightsCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &CacheKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.entry(key.clone()).or_default().clone()
    }

    /// Returns the cached report for `key` and whether it was served from
    /// cache, computing at most once across concurrent callers.
    /// `force_recompute` skips the cached value and overwrites it with a
    /// fresh computation.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: CacheKey,
        force_recompute: bool,
        compute: F,
    ) -> Result<(Arc<InsightsReport>, bool), InsightsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<InsightsReport, InsightsError>>,
    {
        let slot = self.slot(&key);
        let mut guard = slot.lock().await;

        if !force_recompute {
            if let Some(report) = guard.as_ref() {
                debug!(dataset_id = %key.dataset_id, "insights cache hit");
                return Ok((Arc::clone(report), true));
            }
        }

        let report = Arc::new(compute().await?);
        *guard = Some(Arc::clone(&report));
        Ok((report, false))
    }

    /// Drops every cached entry for a dataset, all sampling variants included.
    pub fn invalidate_dataset(&self, dataset_id: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.retain(|k, _| k.dataset_id != dataset_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::models::{DatasetOverview, InsightsAnomalies};

    fn report(dataset_id: &str, marker: u64) -> InsightsReport {
        InsightsReport {
            dataset_id: dataset_id.to_string(),
            generated_at: chrono::Utc::now(),
            sample_rows_used: marker as usize,
            target_column: None,
            dataset_overview: DatasetOverview {
                rows: marker,
                cols: 0,
                missing_rate_global: 0.0,
            },
            column_profiles: BTreeMap::new(),
            anomalies: InsightsAnomalies {
                missing_columns: vec![],
                outliers: vec![],
                suspect_values: vec![],
            },
            recommendations: vec![],
        }
    }

    fn key(dataset_id: &str) -> CacheKey {
        CacheKey {
            dataset_id: dataset_id.to_string(),
            sample_rows: 100,
            target_column: None,
        }
    }

    #[tokio::test]
    async fn second_call_hits_the_cache() {
        let cache = InsightsCache::new();
        let computed = AtomicUsize::new(0);

        for pass in 0..2 {
            let (r, cached) = cache
                .get_or_compute(key("ds1"), false, || async {
                    computed.fetch_add(1, Ordering::SeqCst);
                    Ok(report("ds1", 1))
                })
                .await
                .unwrap();
            assert_eq!(r.dataset_overview.rows, 1);
            assert_eq!(cached, pass == 1);
        }
        assert_eq!(computed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_recompute_overwrites_the_entry() {
        let cache = InsightsCache::new();

        let (first, _) = cache
            .get_or_compute(key("ds1"), false, || async { Ok(report("ds1", 1)) })
            .await
            .unwrap();
        assert_eq!(first.dataset_overview.rows, 1);

        let (second, cached) = cache
            .get_or_compute(key("ds1"), true, || async { Ok(report("ds1", 2)) })
            .await
            .unwrap();
        assert_eq!(second.dataset_overview.rows, 2);
        assert!(!cached);

        // The overwrite sticks for later plain lookups.
        let (third, cached) = cache
            .get_or_compute(key("ds1"), false, || async { Ok(report("ds1", 3)) })
            .await
            .unwrap();
        assert_eq!(third.dataset_overview.rows, 2);
        assert!(cached);
    }

    #[tokio::test]
    async fn concurrent_identical_requests_coalesce() {
        let cache = Arc::new(InsightsCache::new());
        let computed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let computed = Arc::clone(&computed);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute(key("ds1"), false, || async move {
                        computed.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(report("ds1", 7))
                    })
                    .await
                    .unwrap()
            }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().0.dataset_overview.rows, 7);
        }
        assert_eq!(computed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_computation_is_not_cached() {
        let cache = InsightsCache::new();

        let err = cache
            .get_or_compute(key("ds1"), false, || async {
                Err(InsightsError::Validation("boom".into()))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "VALIDATION");

        let (ok, cached) = cache
            .get_or_compute(key("ds1"), false, || async { Ok(report("ds1", 5)) })
            .await
            .unwrap();
        assert_eq!(ok.dataset_overview.rows, 5);
        assert!(!cached);
    }
}
