//! Seam trait for answer generation.
//!
//! The chat flow depends on this trait rather than on a concrete client, so
//! tests can substitute a canned provider without any network.

use async_trait::async_trait;

use crate::error_handler::LlmError;
use crate::services::openai_compatible::OpenAiCompatibleService;

/// Anything that can turn a prompt into a completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generates a single non-streaming completion.
    ///
    /// # Errors
    /// Propagates the underlying provider error.
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError>;

    /// Model identifier, for logging and response metadata.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleService {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        self.generate(prompt, system).await
    }

    fn model_name(&self) -> &str {
        self.model()
    }
}
