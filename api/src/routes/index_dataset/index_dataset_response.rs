use rag_store::IndexReport;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IndexDatasetResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: IndexReport,
}
