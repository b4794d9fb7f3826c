//! Provider-agnostic chat types shared by the clients and their callers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder used when a completion carries no assistant text.
pub const NO_REPLY_PLACEHOLDER: &str = "No reply from model";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One conversation turn, serialized exactly as both wire formats expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-request overrides; `None` falls back to the profile config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Raw completion body as returned by the provider.
///
/// The payload is kept opaque so callers can forward it untouched; the
/// assistant text is read through [`ChatCompletion::reply_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatCompletion(pub Value);

impl ChatCompletion {
    /// Assistant text from `choices[0].message.content` (OpenAI/Mistral) or
    /// `message.content` (Ollama). `None` when neither path holds a string.
    pub fn reply_text(&self) -> Option<&str> {
        self.0
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .or_else(|| self.0.pointer("/message/content").and_then(Value::as_str))
    }

    /// Like [`reply_text`](Self::reply_text) but substitutes
    /// [`NO_REPLY_PLACEHOLDER`] for missing or blank text.
    pub fn reply_or_placeholder(&self) -> String {
        match self.reply_text() {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => NO_REPLY_PLACEHOLDER.to_string(),
        }
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roles_serialize_lowercase() {
        let m = ChatMessage::assistant("ok");
        assert_eq!(
            serde_json::to_value(&m).unwrap(),
            json!({"role": "assistant", "content": "ok"})
        );
        let parsed: ChatMessage =
            serde_json::from_value(json!({"role": "system", "content": "x"})).unwrap();
        assert_eq!(parsed.role, ChatRole::System);
        assert!(serde_json::from_value::<ChatMessage>(json!({"role": "tool", "content": ""})).is_err());
    }

    #[test]
    fn reply_from_openai_shape() {
        let c = ChatCompletion(json!({
            "id": "cmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "UCI::loop reads stdin"}}]
        }));
        assert_eq!(c.reply_text(), Some("UCI::loop reads stdin"));
    }

    #[test]
    fn reply_from_ollama_shape() {
        let c = ChatCompletion(json!({"model": "qwen", "message": {"role": "assistant", "content": "hi"}, "done": true}));
        assert_eq!(c.reply_or_placeholder(), "hi");
    }

    #[test]
    fn placeholder_when_absent_or_blank() {
        assert_eq!(ChatCompletion(json!({"choices": []})).reply_or_placeholder(), NO_REPLY_PLACEHOLDER);
        let blank = ChatCompletion(json!({"choices": [{"message": {"content": "  "}}]}));
        assert_eq!(blank.reply_or_placeholder(), NO_REPLY_PLACEHOLDER);
    }
}
