//! Filesystem access to dataset metadata and row files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::DatasetError;
use crate::meta::DatasetMeta;

/// One dataset row, keyed by column name. Missing cells are absent or null.
pub type Row = Map<String, Value>;

/// Read-side handle over the dataset storage directory.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    storage_dir: PathBuf,
}

impl DatasetStore {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    /// Directory holding one dataset's files.
    pub fn dataset_dir(&self, dataset_id: &str) -> PathBuf {
        self.storage_dir.join(dataset_id)
    }

    /// Loads `metadata.json` for a dataset.
    ///
    /// # Errors
    /// - [`DatasetError::NotFound`] if the dataset directory or file is missing.
    /// - [`DatasetError::Corrupted`] if the file exists but cannot be decoded.
    pub fn load_meta(&self, dataset_id: &str) -> Result<DatasetMeta, DatasetError> {
        let path = self.dataset_dir(dataset_id).join("metadata.json");
        if !path.exists() {
            return Err(DatasetError::NotFound(dataset_id.to_string()));
        }

        let file = File::open(&path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DatasetError::Corrupted(format!("{}: {e}", path.display())))
    }

    /// Reads rows from `rows.jsonl` in file order, up to `limit` if given.
    ///
    /// The reader is tolerant: empty lines are skipped and malformed lines
    /// are logged (`warn!`) but not fatal, so one bad row never blocks
    /// indexing or insights for the rest of the dataset.
    ///
    /// # Errors
    /// - [`DatasetError::NotFound`] if the dataset directory or file is missing.
    /// - [`DatasetError::Io`] on read failures.
    pub fn read_rows(
        &self,
        dataset_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Row>, DatasetError> {
        let path = self.dataset_dir(dataset_id).join("rows.jsonl");
        if !path.exists() {
            return Err(DatasetError::NotFound(dataset_id.to_string()));
        }

        let rows = read_rows_file(&path, limit)?;
        debug!(dataset_id, rows = rows.len(), "loaded dataset rows");
        Ok(rows)
    }
}

fn read_rows_file(path: &Path, limit: Option<usize>) -> Result<Vec<Row>, DatasetError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        if let Some(max) = limit {
            if out.len() >= max {
                break;
            }
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(&line) {
            Ok(Value::Object(map)) => out.push(map),
            Ok(_) => {
                warn!("skipping non-object row on line {}", i + 1);
            }
            Err(e) => {
                warn!("skipping malformed row on line {}: {}", i + 1, e);
            }
        }
    }
    Ok(out)
}
