//! Provider seams used by retrieval and chat.
//!
//! Both traits return boxed futures so they stay object-safe and can be
//! shared as `Arc<dyn ...>`. [`LlmServiceProfiles`] implements both; tests
//! plug in in-memory fakes.

use std::future::Future;
use std::pin::Pin;

use ai_llm_service::{AiLlmError, ChatCompletion, ChatMessage, ChatOptions, LlmServiceProfiles};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Maps text to a fixed-length vector.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, AiLlmError>>;
}

/// Maps a message list to an opaque completion.
pub trait CompletionProvider: Send + Sync {
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        opts: &'a ChatOptions,
    ) -> BoxFuture<'a, Result<ChatCompletion, AiLlmError>>;
}

impl EmbeddingsProvider for LlmServiceProfiles {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, AiLlmError>> {
        Box::pin(LlmServiceProfiles::embed(self, text))
    }
}

impl CompletionProvider for LlmServiceProfiles {
    fn complete<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        opts: &'a ChatOptions,
    ) -> BoxFuture<'a, Result<ChatCompletion, AiLlmError>> {
        Box::pin(self.chat(messages, opts))
    }
}
