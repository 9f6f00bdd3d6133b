use chat_service::ChatOutcome;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: ChatOutcome,
}
