use std::sync::Arc;

use code_retriever::ChatOrchestrator;

/// Listening address when `API_ADDRESS` is unset.
pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";
/// Browser origin allowed when `CORS_ORIGIN` is unset.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Retrieval + completion pipeline; holds the read-only corpus.
    pub chat: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(chat: Arc<ChatOrchestrator>) -> Self {
        Self { chat }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_API_ADDRESS.into(),
            cors_origin: DEFAULT_CORS_ORIGIN.into(),
        }
    }
}

impl ServerConfig {
    /// Load from `API_ADDRESS` and `CORS_ORIGIN`.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            address: get("API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.into()),
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into()),
        }
    }
}
