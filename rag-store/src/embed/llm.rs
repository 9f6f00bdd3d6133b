//! Embedder backed by the shared LLM service.

use async_trait::async_trait;
use std::sync::Arc;

use llm_service::services::openai_compatible::OpenAiCompatibleService;

use crate::embed::Embedder;
use crate::errors::RagError;

/// Adapts the OpenAI-compatible embeddings endpoint to [`Embedder`].
pub struct LlmEmbedder {
    service: Arc<OpenAiCompatibleService>,
}

impl LlmEmbedder {
    pub fn new(service: Arc<OpenAiCompatibleService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Embedder for LlmEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let vectors = self.service.embed_batch(texts).await?;
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        self.service.model()
    }
}
