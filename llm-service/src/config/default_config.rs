//! Default LLM configs loaded strictly from environment variables.
//!
//! Convenience constructors for [`LlmModelConfig`], one per profile:
//!
//! - **Chat**      → grounded answer generation
//! - **Embedding** → embedding vectors for the index
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_PROVIDER`     = backend name (optional, default `openai_compatible`)
//! - `LLM_BASE_URL`     = base URL of the inference server (mandatory)
//! - `LLM_API_KEY`      = optional bearer token
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u64)
//!
//! Per profile:
//! - `LLM_MODEL`           = chat model (mandatory)
//! - `LLM_TEMPERATURE`     = optional chat sampling temperature (f32)
//! - `LLM_MAX_TOKENS`      = optional max tokens for chat (u32)
//! - `LLM_EMBEDDING_MODEL` = embedding model (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, LlmError, env_opt_f32, env_opt_u32, env_opt_u64, must_env},
};

fn base_url() -> Result<String, LlmError> {
    must_env("LLM_BASE_URL")
}

fn api_key() -> Option<String> {
    std::env::var("LLM_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

fn provider() -> Result<LlmProvider, LlmError> {
    match std::env::var("LLM_PROVIDER") {
        Ok(v) if !v.trim().is_empty() => LlmProvider::parse(&v).ok_or_else(|| {
            ConfigError::InvalidFormat {
                var: "LLM_PROVIDER",
                reason: "unknown provider",
            }
            .into()
        }),
        _ => Ok(LlmProvider::OpenAiCompatible),
    }
}

/// Constructs a config for the **chat** profile.
///
/// # Env
/// - `LLM_MODEL` (required)
/// - `LLM_PROVIDER`, `LLM_TEMPERATURE`, `LLM_MAX_TOKENS`, `LLM_TIMEOUT_SECS`
///   (optional)
///
/// # Defaults
/// - `temperature = Some(0.2)`
/// - `timeout_secs = Some(60)`
pub fn config_chat() -> Result<LlmModelConfig, LlmError> {
    let endpoint = base_url()?;
    let model = must_env("LLM_MODEL")?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let temperature = env_opt_f32("LLM_TEMPERATURE")?.or(Some(0.2));
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.or(Some(60));

    Ok(LlmModelConfig {
        provider: provider()?,
        model,
        endpoint,
        api_key: api_key(),
        max_tokens,
        temperature,
        top_p: None,
        timeout_secs,
    })
}

/// Constructs a config for the **embedding** profile.
///
/// # Env
/// - `LLM_EMBEDDING_MODEL` (required)
/// - `LLM_PROVIDER`, `LLM_TIMEOUT_SECS` (optional)
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `max_tokens = None`
/// - `timeout_secs = Some(30)`
pub fn config_embedding() -> Result<LlmModelConfig, LlmError> {
    let endpoint = base_url()?;
    let model = must_env("LLM_EMBEDDING_MODEL")?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.or(Some(30));

    Ok(LlmModelConfig {
        provider: provider()?,
        model,
        endpoint,
        api_key: api_key(),
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs,
    })
}
