//! Chat flow tests over the in-memory index, a deterministic embedder, and a
//! canned completion provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use chat_service::{ChatParams, ChatService, ResponseFormat};
use llm_service::{CompletionProvider, LlmError};
use rag_store::{DocType, Embedder, IndexParams, MemoryIndex, RagConfig, RagError, RagStore};

/// Keyword-count embedder, same shape as the retrieval tests: axis 0 counts
/// France tokens, axis 1 Germany tokens, axis 2 is a constant.
struct StubEmbedder;

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0f32, 0.0, 1.0];
                for token in text
                    .to_lowercase()
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|t| !t.is_empty())
                {
                    match token {
                        "fr" | "france" => v[0] += 1.0,
                        "de" | "germany" => v[1] += 1.0,
                        _ => {}
                    }
                }
                v
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "stub-keywords"
    }
}

/// Canned provider that records the prompts it receives.
struct StubProvider {
    prompts: Mutex<Vec<(String, Option<String>)>>,
}

impl StubProvider {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> (String, Option<String>) {
        self.prompts.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), system.map(str::to_string)));
        Ok("The FR rows hold values 10 and 1000 [dataset:ds1 rows:0-2].".to_string())
    }

    fn model_name(&self) -> &str {
        "stub-chat"
    }
}

fn write_dataset(storage_dir: &std::path::Path, dataset_id: &str) {
    let dir = storage_dir.join(dataset_id);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("metadata.json"),
        format!(
            r#"{{
                "dataset_id": "{dataset_id}",
                "filename": "countries.csv",
                "created_at": "2025-01-01T00:00:00Z",
                "nb_rows": 3,
                "nb_columns": 2,
                "columns": ["country", "value"]
            }}"#
        ),
    )
    .unwrap();
    std::fs::write(
        dir.join("rows.jsonl"),
        concat!(
            r#"{"country":"FR","value":10}"#,
            "\n",
            r#"{"country":"FR","value":1000}"#,
            "\n",
            r#"{"country":"DE","value":12}"#,
            "\n",
        ),
    )
    .unwrap();
}

fn rag_over(storage_dir: &std::path::Path) -> Arc<RagStore> {
    let mut cfg = RagConfig::new_default(
        "http://localhost:6334",
        storage_dir.to_string_lossy().to_string(),
    );
    cfg.rows_per_doc = 10;
    Arc::new(RagStore::new(cfg, Arc::new(MemoryIndex::new()), Arc::new(StubEmbedder)).unwrap())
}

#[tokio::test]
async fn chat_answers_with_citations_and_grounded_prompt() {
    let tmp = tempfile::tempdir().unwrap();
    write_dataset(tmp.path(), "ds1");
    let rag = rag_over(tmp.path());
    rag.index_dataset("ds1", &IndexParams::default())
        .await
        .unwrap();

    let provider = Arc::new(StubProvider::new());
    let service = ChatService::new(rag, provider.clone());

    let outcome = service
        .chat("ds1", "What values do the France rows hold?", &ChatParams::default())
        .await
        .unwrap();

    assert!(outcome.answer.contains("FR rows"));
    assert!(!outcome.citations.is_empty());
    assert_eq!(outcome.citations.len(), outcome.contexts.len());
    assert_eq!(outcome.model, "stub-chat");
    assert!(
        outcome
            .citations
            .iter()
            .any(|c| c.citation == "dataset:ds1 rows:0-2")
    );
    let rows_citation = outcome
        .citations
        .iter()
        .find(|c| c.doc_type == DocType::Rows)
        .unwrap();
    assert_eq!(rows_citation.row_start, Some(0));
    assert_eq!(rows_citation.row_end, Some(2));

    // The prompt carries only retrieved passages plus the question.
    let (prompt, system) = provider.last_prompt();
    assert!(prompt.contains("Question: What values do the France rows hold?"));
    assert!(prompt.contains("country=FR"));
    assert_eq!(system.as_deref(), Some(chat_service::SYSTEM_PROMPT));
}

#[tokio::test]
async fn chat_before_index_reports_not_indexed() {
    let tmp = tempfile::tempdir().unwrap();
    write_dataset(tmp.path(), "ds1");
    let service = ChatService::new(rag_over(tmp.path()), Arc::new(StubProvider::new()));

    let err = service
        .chat("ds1", "anything", &ChatParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_INDEXED");
}

#[tokio::test]
async fn empty_message_is_rejected_before_retrieval() {
    let tmp = tempfile::tempdir().unwrap();
    write_dataset(tmp.path(), "ds1");
    let service = ChatService::new(rag_over(tmp.path()), Arc::new(StubProvider::new()));

    let err = service
        .chat("ds1", "   ", &ChatParams::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION");
}

#[tokio::test]
async fn markdown_format_changes_only_the_rendering_hint() {
    let tmp = tempfile::tempdir().unwrap();
    write_dataset(tmp.path(), "ds1");
    let rag = rag_over(tmp.path());
    rag.index_dataset("ds1", &IndexParams::default())
        .await
        .unwrap();

    let provider = Arc::new(StubProvider::new());
    let service = ChatService::new(rag, provider.clone());

    let params = ChatParams {
        response_format: ResponseFormat::Markdown,
        ..ChatParams::default()
    };
    service.chat("ds1", "Summarize the data", &params).await.unwrap();

    let (prompt, _) = provider.last_prompt();
    assert!(prompt.contains("Response format: markdown"));
}
