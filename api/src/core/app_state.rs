use std::sync::Arc;

use thiserror::Error;

use chat_service::ChatService;
use dataset_store::DatasetStore;
use insights_engine::{InsightsEngine, InsightsError};
use llm_service::{CompletionProvider, LlmError};
use llm_service::config::default_config::{config_chat, config_embedding};
use llm_service::services::openai_compatible::OpenAiCompatibleService;
use rag_store::{LlmEmbedder, RagError, RagStore};
use report_service::ReportService;

/// Startup configuration failure, one variant per subsystem.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("llm config: {0}")]
    Llm(#[from] LlmError),

    #[error("rag config: {0}")]
    Rag(#[from] RagError),

    #[error("insights config: {0}")]
    Insights(#[from] InsightsError),
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Indexing + cited retrieval over the vector store.
    pub rag: Arc<RagStore>,
    /// Statistical profiling, anomalies, chart suggestions.
    pub insights: Arc<InsightsEngine>,
    /// Grounded chat orchestration.
    pub chat: Arc<ChatService>,
    /// Executive report generation.
    pub report: Arc<ReportService>,
}

impl AppState {
    /// Wires every subsystem from environment variables.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// client cannot be constructed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let embed_service = Arc::new(OpenAiCompatibleService::new(config_embedding()?)?);
        let rag = Arc::new(RagStore::from_env(Arc::new(LlmEmbedder::new(
            embed_service,
        )))?);

        let storage_dir = rag.config().storage_dir.clone();
        let insights = Arc::new(InsightsEngine::from_env(DatasetStore::new(&storage_dir))?);

        let chat_provider = Arc::new(OpenAiCompatibleService::new(config_chat()?)?);
        let chat = Arc::new(ChatService::new(rag.clone(), chat_provider.clone()));

        let report = Arc::new(ReportService::new(
            insights.clone(),
            DatasetStore::new(&storage_dir),
            Some(chat_provider as Arc<dyn CompletionProvider>),
        ));

        Ok(Self {
            rag,
            insights,
            chat,
            report,
        })
    }
}
