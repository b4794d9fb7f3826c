use crate::config::llm_provider::LlmProvider;

/// Configuration for one model profile (chat or embedding).
///
/// # Fields
///
/// - `provider`: backend to talk to.
/// - `model`: model identifier (e.g. `"codestral-latest"`, `"mistral-embed"`).
/// - `endpoint`: base URL without the route suffix.
/// - `api_key`: bearer token for hosted providers.
/// - `max_tokens`: default generation budget (chat profiles only).
/// - `temperature` / `top_p`: sampling knobs forwarded when set.
/// - `timeout_secs`: HTTP client timeout.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Mistral,
///     model: "codestral-latest".to_string(),
///     endpoint: "https://api.mistral.ai".to_string(),
///     api_key: Some("sk-...".to_string()),
///     max_tokens: Some(256),
///     temperature: None,
///     top_p: None,
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.route("/v1/embeddings"), "https://api.mistral.ai/v1/embeddings");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Joins the endpoint with an absolute route, tolerating trailing slashes.
    pub fn route(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim().trim_end_matches('/'), path)
    }
}
