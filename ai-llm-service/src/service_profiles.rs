//! Shared LLM service with two profiles: `chat` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Profiles with an identical provider config share one HTTP client.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::chat::{ChatMessage, ChatOptions};
//! use ai_llm_service::config::default_config::{config_chat, config_embedding};
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(config_chat()?, config_embedding()?)?);
//!
//! let emb = svc.embed("where is the UCI loop?").await?;
//! println!("Embedding dim = {}", emb.len());
//!
//! let out = svc
//!     .chat(&[ChatMessage::user("Hello")], &ChatOptions::default())
//!     .await?;
//! println!("{}", out.reply_or_placeholder());
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    chat::{ChatCompletion, ChatMessage, ChatOptions},
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Concrete client bound to one profile.
#[derive(Debug, Clone)]
enum ProviderClient {
    OpenAi(Arc<OpenAiService>),
    Ollama(Arc<OllamaService>),
}

impl ProviderClient {
    fn build(cfg: &LlmModelConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::Mistral | LlmProvider::OpenAI => {
                ProviderClient::OpenAi(Arc::new(OpenAiService::new(cfg.clone())?))
            }
            LlmProvider::Ollama => ProviderClient::Ollama(Arc::new(OllamaService::new(cfg.clone())?)),
        })
    }
}

/// Chat + embedding profiles with their ready-to-use clients.
#[derive(Debug)]
pub struct LlmServiceProfiles {
    chat_cfg: LlmModelConfig,
    embedding_cfg: LlmModelConfig,
    chat: ProviderClient,
    embedding: ProviderClient,
}

impl LlmServiceProfiles {
    /// Builds both clients eagerly so misconfiguration surfaces at startup.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if either client cannot be constructed.
    pub fn new(chat_cfg: LlmModelConfig, embedding_cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let chat = ProviderClient::build(&chat_cfg)?;
        let embedding = if embedding_cfg == chat_cfg {
            chat.clone()
        } else {
            ProviderClient::build(&embedding_cfg)?
        };

        info!(
            provider = ?chat_cfg.provider,
            chat_model = %chat_cfg.model,
            embedding_model = %embedding_cfg.model,
            "LLM profiles ready"
        );

        Ok(Self {
            chat_cfg,
            embedding_cfg,
            chat,
            embedding,
        })
    }

    /// Non-streaming chat completion with the **chat** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] on transport, status or decode failures.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        opts: &ChatOptions,
    ) -> Result<ChatCompletion, AiLlmError> {
        match &self.chat {
            ProviderClient::OpenAi(cli) => cli.chat(messages, opts).await,
            ProviderClient::Ollama(cli) => cli.chat(messages, opts).await,
        }
    }

    /// Computes an embedding with the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if embedding fails or the vector is empty.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match &self.embedding {
            ProviderClient::OpenAi(cli) => cli.embeddings(input).await,
            ProviderClient::Ollama(cli) => cli.embeddings(input).await,
        }
    }

    /// Returns references to the current profiles `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat_cfg, &self.embedding_cfg)
    }
}
