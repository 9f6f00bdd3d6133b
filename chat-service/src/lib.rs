//! Grounded chat over an indexed dataset.
//!
//! Orchestration: retrieve cited passages from [`rag_store::RagStore`],
//! assemble a grounding prompt, call the completion provider, return the
//! answer with the citations actually used. Nothing reaches the prompt that
//! retrieval did not return.

mod errors;
mod prompt;

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use llm_service::CompletionProvider;
use rag_store::{DocType, RagError, RagStore, SearchHit};

pub use crate::errors::ChatError;
pub use crate::prompt::SYSTEM_PROMPT;

/// Rendering hint forwarded to the model. Content is identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Plain,
    Markdown,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Plain => "plain",
            ResponseFormat::Markdown => "markdown",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ChatError> {
        match s {
            "plain" => Ok(ResponseFormat::Plain),
            "markdown" => Ok(ResponseFormat::Markdown),
            other => Err(ChatError::Validation(format!(
                "unknown response_format: {other}"
            ))),
        }
    }
}

/// Options for one chat turn.
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub top_k: u64,
    pub doc_types: Vec<DocType>,
    pub response_format: ResponseFormat,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            doc_types: Vec::new(),
            response_format: ResponseFormat::Plain,
        }
    }
}

/// Source reference attached to an answer.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCitation {
    pub citation: String,
    pub doc_type: DocType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_start: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_end: Option<usize>,
    pub score: f32,
}

/// Passage that grounded the answer, with its retrieval score.
#[derive(Debug, Clone, Serialize)]
pub struct ChatContext {
    pub text: String,
    pub citation: String,
    pub score: f32,
}

/// Full result of one chat turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub answer: String,
    pub citations: Vec<ChatCitation>,
    pub contexts: Vec<ChatContext>,
    pub model: String,
    pub latency_ms: u64,
    pub retrieval_ms: u64,
    pub llm_ms: u64,
}

/// Chat orchestrator bound to one store and one completion provider.
pub struct ChatService {
    rag: Arc<RagStore>,
    provider: Arc<dyn CompletionProvider>,
}

impl ChatService {
    pub fn new(rag: Arc<RagStore>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { rag, provider }
    }

    /// Answers one question about a dataset, grounded in retrieved passages.
    ///
    /// # Errors
    /// - [`ChatError::Validation`] for an empty message.
    /// - `NotIndexed` (via [`ChatError::Rag`]) when the dataset has no
    ///   indexed documents; callers surface this as "index before chat".
    /// - [`ChatError::Llm`] when the completion provider fails or times out.
    pub async fn chat(
        &self,
        dataset_id: &str,
        message: &str,
        params: &ChatParams,
    ) -> Result<ChatOutcome, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::Validation("message must not be empty".into()));
        }

        let started = Instant::now();
        let hits = self
            .rag
            .search(dataset_id, message, params.top_k, &params.doc_types)
            .await?;
        let retrieval_ms = started.elapsed().as_millis() as u64;

        // Retrieval only succeeds against a populated collection, so an
        // empty hit list means the index emptied out underneath us.
        if hits.is_empty() {
            return Err(ChatError::Rag(RagError::NotIndexed(dataset_id.to_string())));
        }

        let prompt = prompt::build_prompt(message, &hits, params.response_format);

        let llm_started = Instant::now();
        let answer = self
            .provider
            .complete(&prompt, Some(SYSTEM_PROMPT))
            .await?;
        let llm_ms = llm_started.elapsed().as_millis() as u64;
        let latency_ms = started.elapsed().as_millis() as u64;

        info!(
            dataset_id,
            top_k = params.top_k,
            hits = hits.len(),
            retrieval_ms,
            llm_ms,
            latency_ms,
            model = self.provider.model_name(),
            "chat completed"
        );

        Ok(ChatOutcome {
            answer,
            citations: hits.iter().map(citation_of).collect(),
            contexts: hits
                .iter()
                .map(|h| ChatContext {
                    text: h.text.clone(),
                    citation: h.citation.clone(),
                    score: h.score,
                })
                .collect(),
            model: self.provider.model_name().to_string(),
            latency_ms,
            retrieval_ms,
            llm_ms,
        })
    }
}

fn citation_of(hit: &SearchHit) -> ChatCitation {
    ChatCitation {
        citation: hit.citation.clone(),
        doc_type: hit.doc_type,
        row_start: hit.row_start,
        row_end: hit.row_end,
        score: hit.score,
    }
}
