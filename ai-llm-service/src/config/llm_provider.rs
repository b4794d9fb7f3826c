use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Backend used for chat completions and embeddings.
///
/// `Mistral` and `OpenAI` speak the same wire format
/// (`/v1/chat/completions`, `/v1/embeddings`) and only differ in their
/// default endpoint. `Ollama` uses its native `/api/chat` and
/// `/api/embeddings` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Hosted Mistral API (`https://api.mistral.ai`).
    Mistral,
    /// OpenAI or any OpenAI-compatible gateway.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

impl LlmProvider {
    /// Endpoint used when `LLM_URL` is not set.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Mistral => "https://api.mistral.ai",
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Ollama => "http://localhost:11434",
        }
    }

    /// Whether requests must carry a bearer token.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, LlmProvider::Ollama)
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mistral" => Ok(LlmProvider::Mistral),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
