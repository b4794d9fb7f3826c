use ai_llm_service::ChatMessage;
use code_retriever::{ChatOutcome, ChatRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request payload for /chat.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    /// Conversation so far; the last message is the retrieval query.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Optional override of the configured chat model.
    #[serde(default)]
    pub model: Option<String>,
    /// Optional override of the generation budget.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl From<ChatBody> for ChatRequest {
    fn from(b: ChatBody) -> Self {
        ChatRequest {
            messages: b.messages,
            model: b.model.filter(|m| !m.trim().is_empty()),
            max_tokens: b.max_tokens.filter(|&n| n > 0),
        }
    }
}

/// Response payload for /chat.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    /// Retrieved snippet texts, best match first.
    pub retrieved: Vec<String>,
    /// Provider response, forwarded untouched.
    pub completion: Value,
    /// Assistant text extracted from `completion`.
    pub reply: String,
}

impl From<ChatOutcome> for ChatResponse {
    fn from(o: ChatOutcome) -> Self {
        Self {
            retrieved: o.retrieved,
            completion: o.completion,
            reply: o.reply,
        }
    }
}
