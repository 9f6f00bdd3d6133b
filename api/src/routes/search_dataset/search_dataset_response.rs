use rag_store::SearchHit;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SearchDatasetResponse {
    pub message: String,
    pub query: String,
    pub results: Vec<SearchHit>,
}
