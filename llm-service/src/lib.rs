//! OpenAI-compatible LLM client shared by the backend.
//!
//! Two profiles are used in practice:
//! - **chat**      -> grounded answer generation (non-streaming)
//! - **embedding** -> batched embedding vectors for the vector index
//!
//! Construct an [`services::openai_compatible::OpenAiCompatibleService`] once
//! per profile, wrap it in `Arc`, and pass clones to dependents. Providers
//! that speak the OpenAI REST shape (OpenAI itself, vLLM, LM Studio, Ollama's
//! compat endpoint) all work through the same client.

pub mod config;
pub mod error_handler;
pub mod provider;
pub mod services;

pub use error_handler::{LlmError, ProviderError};
pub use provider::CompletionProvider;
