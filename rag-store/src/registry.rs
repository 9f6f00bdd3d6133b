//! Per-dataset build state: in-flight index guard and the on-disk marker.
//!
//! The marker (`index_metadata.json` next to the dataset files) is the
//! source of truth for "has this dataset ever been indexed", what embedding
//! model produced the vectors, and their dimension. The guard ensures at
//! most one index build per dataset runs at a time; a second concurrent
//! request is rejected rather than queued.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::errors::RagError;

/// Persisted record of the last successful index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMarker {
    pub embedding_model: String,
    pub dim: usize,
    pub nb_docs: usize,
    pub indexed_at: DateTime<Utc>,
}

const MARKER_FILE: &str = "index_metadata.json";

/// Reads the marker if the dataset was ever indexed.
///
/// # Errors
/// Returns [`RagError::Parse`] if the file exists but cannot be decoded.
pub fn read_marker(dataset_dir: &Path) -> Result<Option<IndexMarker>, RagError> {
    let path = dataset_dir.join(MARKER_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Writes the marker atomically (tmp file + rename).
pub fn write_marker(dataset_dir: &Path, marker: &IndexMarker) -> Result<(), RagError> {
    let path = dataset_dir.join(MARKER_FILE);
    let tmp: PathBuf = dataset_dir.join(format!("{MARKER_FILE}.tmp"));
    std::fs::write(&tmp, serde_json::to_vec_pretty(marker)?)?;
    std::fs::rename(&tmp, &path)?;
    debug!(path = %path.display(), "index marker written");
    Ok(())
}

/// Removes the marker; a cleared dataset reads as "not indexed".
pub fn remove_marker(dataset_dir: &Path) -> Result<(), RagError> {
    let path = dataset_dir.join(MARKER_FILE);
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok(())
}

/// Tracks which datasets have an index build in flight.
#[derive(Default)]
pub struct DatasetRegistry {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the build slot for a dataset.
    ///
    /// The returned guard holds the slot until dropped.
    ///
    /// # Errors
    /// Returns [`RagError::IndexInProgress`] when another build holds it.
    pub fn try_begin_index(&self, dataset_id: &str) -> Result<OwnedMutexGuard<()>, RagError> {
        let lock = {
            // The map is only inserted into, so a poisoned lock still holds
            // a usable map.
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            locks
                .entry(dataset_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.try_lock_owned()
            .map_err(|_| RagError::IndexInProgress(dataset_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_roundtrip_and_removal() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_marker(tmp.path()).unwrap().is_none());

        let marker = IndexMarker {
            embedding_model: "test-embed".into(),
            dim: 8,
            nb_docs: 3,
            indexed_at: Utc::now(),
        };
        write_marker(tmp.path(), &marker).unwrap();

        let back = read_marker(tmp.path()).unwrap().unwrap();
        assert_eq!(back.embedding_model, "test-embed");
        assert_eq!(back.dim, 8);
        assert_eq!(back.nb_docs, 3);

        remove_marker(tmp.path()).unwrap();
        assert!(read_marker(tmp.path()).unwrap().is_none());
    }

    #[test]
    fn poisoned_registry_still_hands_out_slots() {
        let reg = DatasetRegistry::new();
        std::thread::scope(|s| {
            // Poison the map lock by panicking while holding it.
            let _ = s
                .spawn(|| {
                    let _guard = reg.locks.lock().unwrap();
                    panic!("poison");
                })
                .join();
        });

        assert!(reg.try_begin_index("ds1").is_ok());
    }

    #[test]
    fn second_build_claim_is_rejected() {
        let reg = DatasetRegistry::new();
        let guard = reg.try_begin_index("ds1").unwrap();
        assert!(matches!(
            reg.try_begin_index("ds1"),
            Err(RagError::IndexInProgress(_))
        ));
        // Different dataset is independent.
        let _other = reg.try_begin_index("ds2").unwrap();
        drop(guard);
        assert!(reg.try_begin_index("ds1").is_ok());
    }
}
