//! Public request/response types re-used by the HTTP layer.

use ai_llm_service::ChatMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One chat turn as sent by a client.
///
/// `model` and `max_tokens` override the configured defaults when present.
///
/// # Example
/// ```
/// use code_retriever::ChatRequest;
/// let req: ChatRequest = serde_json::from_str(
///     r#"{"messages":[{"role":"user","content":"explain uci"}]}"#,
/// ).unwrap();
/// assert_eq!(req.query(), "explain uci");
/// assert!(req.model.is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Retrieval query: content of the last message, whatever its role;
    /// `""` for an empty conversation.
    pub fn query(&self) -> &str {
        self.messages.last().map_or("", |m| m.content.as_str())
    }
}

/// Reply plus the evidence that was fed to the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// Retrieved chunk texts, best match first.
    pub retrieved: Vec<String>,
    /// Provider response body, untouched.
    pub completion: Value,
    /// Assistant text, or the "No reply from model" placeholder.
    pub reply: String,
}
