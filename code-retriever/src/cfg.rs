//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ai_llm_service::config::default_config::{DEFAULT_CHAT_MODEL, DEFAULT_MAX_TOKENS};
use ai_llm_service::config::llm_model_config::LlmModelConfig;
use tracing::warn;

use crate::boost::{DEFAULT_BONUS, KeywordBooster, stockfish_rules};
use crate::chat::ChatDefaults;
use crate::corpus::Corpus;
use crate::error::{BoostRuleError, CorpusError};
use crate::prompt::{DEFAULT_PROJECT, PromptAssembler};
use crate::retrieve::RetrieverOptions;

/// Retrieval and orchestration knobs. All fields have defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrieverConfig {
    pub corpus_path: PathBuf,
    pub top_k: usize,
    pub embed_timeout_secs: u64,
    pub embed_retries: u32,
    pub retry_backoff_ms: u64,
    pub completion_timeout_secs: u64,
    pub boost_bonus: f32,
    /// JSON rule table replacing the built-in one.
    pub boost_rules_path: Option<PathBuf>,
    pub project_name: String,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl RetrieverConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Builds the config from an arbitrary `key -> value` source.
    ///
    /// Unparseable numbers fall back to their default with a warning.
    ///
    /// # Example
    /// ```
    /// use code_retriever::RetrieverConfig;
    /// let cfg = RetrieverConfig::from_lookup(|k| (k == "RAG_TOP_K").then(|| "5".to_string()));
    /// assert_eq!(cfg.top_k, 5);
    /// assert_eq!(cfg.project_name, "Stockfish");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            corpus_path: get("CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("stockfish_docs.json")),
            top_k: parse(&get, "RAG_TOP_K", 3usize),
            embed_timeout_secs: parse(&get, "EMBED_TIMEOUT_SECS", 30u64),
            embed_retries: parse(&get, "EMBED_RETRIES", 1u32),
            retry_backoff_ms: parse(&get, "EMBED_RETRY_BACKOFF_MS", 200u64),
            completion_timeout_secs: parse(&get, "COMPLETION_TIMEOUT_SECS", 90u64),
            boost_bonus: parse(&get, "BOOST_BONUS", DEFAULT_BONUS),
            boost_rules_path: get("BOOST_RULES_PATH").map(PathBuf::from),
            project_name: get("PROJECT_NAME").unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
        }
    }

    pub fn retriever_options(&self) -> RetrieverOptions {
        RetrieverOptions {
            default_k: self.top_k,
            embed_timeout: Duration::from_secs(self.embed_timeout_secs),
            embed_retries: self.embed_retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    /// Rules from `BOOST_RULES_PATH`, or the built-in table with `BOOST_BONUS`.
    ///
    /// # Errors
    /// A configured rules file that cannot be read, parsed or validated.
    pub fn booster(&self) -> Result<KeywordBooster, BoostRuleError> {
        match &self.boost_rules_path {
            Some(path) => KeywordBooster::from_json_file(path),
            None => KeywordBooster::new(stockfish_rules(self.boost_bonus)),
        }
    }

    /// See [`Corpus::load_or_empty`].
    pub fn load_corpus(&self) -> Result<Corpus, CorpusError> {
        Corpus::load_or_empty(&self.corpus_path)
    }

    pub fn assembler(&self) -> PromptAssembler {
        PromptAssembler::new(self.project_name.clone())
    }

    /// Request defaults: model and token budget come from the chat profile.
    pub fn chat_defaults(&self, chat: &LlmModelConfig) -> ChatDefaults {
        let model = if chat.model.trim().is_empty() {
            DEFAULT_CHAT_MODEL.to_string()
        } else {
            chat.model.clone()
        };
        ChatDefaults {
            model,
            max_tokens: chat.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            completion_timeout: Duration::from_secs(self.completion_timeout_secs),
        }
    }
}

fn parse<T, G>(get: &G, k: &str, dflt: T) -> T
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(k) {
        None => dflt,
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!(var = k, value = %v, "invalid value, using default");
            dflt
        }),
    }
}
