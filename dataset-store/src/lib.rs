//! Row Source for the data copilot backend.
//!
//! A dataset lives under `<storage_dir>/<dataset_id>/` as two files produced
//! by the upload pipeline (CSV parsing itself happens upstream):
//! - `metadata.json` -> schema, row counts, aggregate stats, warnings
//! - `rows.jsonl`    -> one JSON object per row, in original file order
//!
//! This crate exposes ordered row access plus the typed schema; everything
//! derived (vector index, insights) is built on top of it by other crates.

mod errors;
mod meta;
mod rows;
mod schema;

pub use errors::DatasetError;
pub use meta::{DatasetMeta, NumericOverview, TopValue};
pub use rows::{DatasetStore, Row};
pub use schema::ColumnType;
