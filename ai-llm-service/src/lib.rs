//! Chat-completion and embedding clients used by the Q&A backend.
//!
//! [`service_profiles::LlmServiceProfiles`] is the entry point: it owns a
//! chat profile and an embedding profile, each bound to a Mistral/OpenAI
//! compatible or Ollama client.

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use chat::{ChatCompletion, ChatMessage, ChatOptions, ChatRole, NO_REPLY_PLACEHOLDER};
pub use error_handler::AiLlmError;
pub use service_profiles::LlmServiceProfiles;
