//! Grounding prompt assembly.
//!
//! The prompt contains only retrieved passage text plus the user message.
//! Summary passages come before row passages so the model reads schema and
//! aggregates before individual records.

use rag_store::{DocType, SearchHit};

use crate::ResponseFormat;

pub const SYSTEM_PROMPT: &str = "You are a data assistant for dataset Q&A. \
Use only the provided context. Do not make up information. \
If the answer is not in the context, say you do not have enough information. \
Always cite sources using the provided citation strings.";

/// Builds the user-turn prompt from retrieved passages.
pub fn build_prompt(message: &str, hits: &[SearchHit], format: ResponseFormat) -> String {
    let mut summary_blocks: Vec<String> = Vec::new();
    let mut row_blocks: Vec<String> = Vec::new();

    for hit in hits {
        let block = format!("Source: {}\n{}", hit.citation, hit.text);
        match hit.doc_type {
            DocType::Summary => summary_blocks.push(block),
            DocType::Rows => row_blocks.push(block),
        }
    }

    let mut parts: Vec<String> = vec![
        format!("Question: {message}"),
        format!("Response format: {}", format.as_str()),
        "Context:".to_string(),
    ];
    if !summary_blocks.is_empty() {
        parts.push("Dataset summary:".to_string());
        parts.extend(summary_blocks);
    }
    if !row_blocks.is_empty() {
        parts.push("Rows context:".to_string());
        parts.extend(row_blocks);
    }
    parts.push("Answer clearly and concisely. Use citations inline like [dataset:...].".to_string());

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(doc_type: DocType, citation: &str, text: &str) -> SearchHit {
        SearchHit {
            score: 0.5,
            text: text.to_string(),
            doc_type,
            row_start: None,
            row_end: None,
            citation: citation.to_string(),
        }
    }

    #[test]
    fn summary_blocks_precede_row_blocks() {
        let hits = vec![
            hit(DocType::Rows, "dataset:ds1 rows:0-9", "row_index=0 | a=1"),
            hit(DocType::Summary, "dataset:ds1 dataset summary", "Dataset orders.csv"),
        ];
        let prompt = build_prompt("total?", &hits, ResponseFormat::Plain);

        let summary_pos = prompt.find("Dataset orders.csv").unwrap();
        let rows_pos = prompt.find("row_index=0").unwrap();
        assert!(summary_pos < rows_pos);
        assert!(prompt.starts_with("Question: total?"));
    }

    #[test]
    fn prompt_contains_only_retrieved_text_and_message() {
        let hits = vec![hit(DocType::Rows, "dataset:ds1 rows:0-9", "row_index=0 | a=1")];
        let prompt = build_prompt("what is a?", &hits, ResponseFormat::Markdown);
        assert!(prompt.contains("Response format: markdown"));
        assert!(prompt.contains("Source: dataset:ds1 rows:0-9"));
        assert!(!prompt.contains("Dataset summary:"));
    }
}
