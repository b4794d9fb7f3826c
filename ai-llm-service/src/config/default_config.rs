//! Default model configs loaded from environment variables.
//!
//! Two roles are built from the same provider settings:
//!
//! - **Chat**      → completion model that answers the question
//! - **Embedding** → model used to embed queries (must match the corpus)
//!
//! # Environment variables
//!
//! - `LLM_KIND`         = `mistral` (default) | `openai` | `ollama`
//! - `LLM_API_KEY`      = bearer token (falls back to `MISTRAL_API_KEY`); required unless Ollama
//! - `LLM_URL`          = base endpoint (defaults per provider)
//! - `CHAT_MODEL`       = chat model (default `codestral-latest`)
//! - `EMBEDDING_MODEL`  = embedding model (default `mistral-embed`)
//! - `LLM_MAX_TOKENS`   = default completion budget (default `256`)
//! - `LLM_TIMEOUT_SECS` = HTTP timeout for chat calls (default `60`)
//! - `EMBEDDING_TIMEOUT_SECS` = HTTP timeout for embedding calls (default `30`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_opt_u64, opt_env, validate_http_endpoint,
    },
};

pub const DEFAULT_CHAT_MODEL: &str = "codestral-latest";
pub const DEFAULT_EMBEDDING_MODEL: &str = "mistral-embed";
pub const DEFAULT_MAX_TOKENS: u32 = 256;

/// Provider settings shared by both roles.
#[derive(Debug, Clone, PartialEq)]
struct ProviderSettings {
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
}

fn provider_settings() -> Result<ProviderSettings, AiLlmError> {
    let provider = match opt_env("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::Mistral,
    };

    let endpoint = opt_env("LLM_URL").unwrap_or_else(|| provider.default_endpoint().to_string());
    validate_http_endpoint("LLM_URL", &endpoint)?;

    let api_key = opt_env("LLM_API_KEY").or_else(|| opt_env("MISTRAL_API_KEY"));
    if provider.requires_api_key() && api_key.is_none() {
        return Err(ConfigError::MissingVar("LLM_API_KEY or MISTRAL_API_KEY").into());
    }

    Ok(ProviderSettings {
        provider,
        endpoint,
        api_key,
    })
}

fn model_from_env(var: &str, default: &str) -> Result<String, AiLlmError> {
    let model = opt_env(var).unwrap_or_else(|| default.to_string());
    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }
    Ok(model.trim().to_string())
}

/// Constructs the **chat** profile.
///
/// # Defaults
/// - `model = codestral-latest`
/// - `max_tokens = 256`
/// - `timeout_secs = 60`
pub fn config_chat() -> Result<LlmModelConfig, AiLlmError> {
    let p = provider_settings()?;
    Ok(LlmModelConfig {
        provider: p.provider,
        model: model_from_env("CHAT_MODEL", DEFAULT_CHAT_MODEL)?,
        endpoint: p.endpoint,
        api_key: p.api_key,
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_MAX_TOKENS)),
        temperature: None,
        top_p: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(60)),
    })
}

/// Constructs the **embedding** profile.
///
/// The query must be embedded with the same model that produced the corpus
/// vectors, otherwise retrieval fails on dimension checks.
///
/// # Defaults
/// - `model = mistral-embed`
/// - `timeout_secs = 30`
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let p = provider_settings()?;
    Ok(LlmModelConfig {
        provider: p.provider,
        model: model_from_env("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL)?,
        endpoint: p.endpoint,
        api_key: p.api_key,
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(env_opt_u64("EMBEDDING_TIMEOUT_SECS")?.unwrap_or(30)),
    })
}
