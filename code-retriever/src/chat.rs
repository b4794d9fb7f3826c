//! Chat orchestration: retrieve, assemble, complete.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_llm_service::ChatOptions;
use ai_llm_service::config::default_config::{DEFAULT_CHAT_MODEL, DEFAULT_MAX_TOKENS};
use tracing::{debug, error, info};

use crate::api_types::{ChatOutcome, ChatRequest};
use crate::error::ChatError;
use crate::prompt::PromptAssembler;
use crate::providers::CompletionProvider;
use crate::retrieve::Retriever;

/// Values applied when a request leaves them out.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatDefaults {
    pub model: String,
    pub max_tokens: u32,
    pub completion_timeout: Duration,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            completion_timeout: Duration::from_secs(90),
        }
    }
}

/// One request path: query → retrieval → prompt → completion → reply.
pub struct ChatOrchestrator {
    retriever: Arc<Retriever>,
    assembler: PromptAssembler,
    llm: Arc<dyn CompletionProvider>,
    defaults: ChatDefaults,
}

impl ChatOrchestrator {
    pub fn new(
        retriever: Arc<Retriever>,
        assembler: PromptAssembler,
        llm: Arc<dyn CompletionProvider>,
        defaults: ChatDefaults,
    ) -> Self {
        Self {
            retriever,
            assembler,
            llm,
            defaults,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn defaults(&self) -> &ChatDefaults {
        &self.defaults
    }

    /// Answers the conversation in `request`.
    ///
    /// # Errors
    /// - [`ChatError::Retrieval`] on a query/corpus dimension mismatch.
    /// - [`ChatError::Completion`] / [`ChatError::CompletionTimeout`] when the
    ///   completion provider fails; retrieval problems never end up here.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome, ChatError> {
        let started = Instant::now();
        let query = request.query();

        let retrieved = self.retriever.retrieve_default(query).await?;
        debug!(hits = retrieved.len(), "retrieval done");

        let messages = self.assembler.assemble(&retrieved, &request.messages);
        let opts = ChatOptions {
            model: Some(request.model.clone().unwrap_or_else(|| self.defaults.model.clone())),
            max_tokens: Some(request.max_tokens.unwrap_or(self.defaults.max_tokens)),
        };

        let completion = match tokio::time::timeout(
            self.defaults.completion_timeout,
            self.llm.complete(&messages, &opts),
        )
        .await
        {
            Ok(Ok(c)) => c,
            Ok(Err(e)) => {
                error!(error = %e, model = ?opts.model, "completion failed");
                return Err(ChatError::Completion(e));
            }
            Err(_) => {
                error!(
                    timeout_ms = self.defaults.completion_timeout.as_millis(),
                    model = ?opts.model,
                    "completion timed out"
                );
                return Err(ChatError::CompletionTimeout(self.defaults.completion_timeout));
            }
        };

        let reply = completion.reply_or_placeholder();
        info!(
            model = ?opts.model,
            messages = messages.len(),
            hits = retrieved.len(),
            latency_ms = started.elapsed().as_millis(),
            "chat answered"
        );

        Ok(ChatOutcome {
            retrieved: retrieved.iter().map(|s| s.chunk.text.clone()).collect(),
            completion: completion.into_inner(),
            reply,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ai_llm_service::error_handler::{HttpError, Provider, ProviderError, ProviderErrorKind};
    use ai_llm_service::{AiLlmError, ChatCompletion, ChatMessage, ChatRole, NO_REPLY_PLACEHOLDER};
    use serde_json::json;

    use super::*;
    use crate::boost::{DEFAULT_BONUS, KeywordBooster, stockfish_rules};
    use crate::corpus::{Corpus, DocumentChunk};
    use crate::error::{DimensionMismatch, RetrieveError};
    use crate::providers::{BoxFuture, EmbeddingsProvider};
    use crate::retrieve::RetrieverOptions;

    struct FixedEmbedder(Option<Vec<f32>>);

    impl EmbeddingsProvider for FixedEmbedder {
        fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, AiLlmError>> {
            Box::pin(async move {
                self.0
                    .clone()
                    .ok_or(AiLlmError::Timeout(Duration::from_millis(1)))
            })
        }
    }

    enum Reply {
        Body(serde_json::Value),
        Status(u16),
        Hang,
    }

    struct FakeLlm {
        reply: Reply,
        calls: AtomicUsize,
        seen: Mutex<Option<(Vec<ChatMessage>, ChatOptions)>>,
    }

    impl FakeLlm {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(None),
            })
        }

        fn seen(&self) -> (Vec<ChatMessage>, ChatOptions) {
            self.seen.lock().unwrap().clone().unwrap()
        }
    }

    impl CompletionProvider for FakeLlm {
        fn complete<'a>(
            &'a self,
            messages: &'a [ChatMessage],
            opts: &'a ChatOptions,
        ) -> BoxFuture<'a, Result<ChatCompletion, AiLlmError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some((messages.to_vec(), opts.clone()));
            Box::pin(async move {
                match &self.reply {
                    Reply::Body(v) => Ok(ChatCompletion(v.clone())),
                    Reply::Status(code) => Err(ProviderError::new(
                        Provider::OpenAI,
                        ProviderErrorKind::HttpStatus(HttpError {
                            status: reqwest_status(*code),
                            url: "https://api.mistral.ai/v1/chat/completions".into(),
                            snippet: "upstream down".into(),
                        }),
                    )
                    .into()),
                    Reply::Hang => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok(ChatCompletion(json!({})))
                    }
                }
            })
        }
    }

    fn reqwest_status(code: u16) -> ai_llm_service::error_handler::StatusCode {
        ai_llm_service::error_handler::StatusCode::from_u16(code).unwrap()
    }

    fn corpus() -> Arc<Corpus> {
        let chunk = |path: &str, text: &str, embedding: Vec<f32>| DocumentChunk {
            path: path.into(),
            text: text.into(),
            start_line: 1,
            end_line: 40,
            embedding,
        };
        Arc::new(
            Corpus::new(vec![
                chunk("uci.cpp", "... uci::loop ...", vec![1.0, 0.0]),
                chunk("eval.cpp", "...", vec![0.0, 1.0]),
            ])
            .unwrap(),
        )
    }

    fn orchestrator(
        corpus: Arc<Corpus>,
        qvec: Option<Vec<f32>>,
        llm: Arc<FakeLlm>,
        completion_timeout: Duration,
    ) -> ChatOrchestrator {
        let opts = RetrieverOptions {
            default_k: 1,
            embed_retries: 0,
            ..RetrieverOptions::default()
        };
        let retriever = Retriever::new(
            corpus,
            Arc::new(FixedEmbedder(qvec)),
            KeywordBooster::new(stockfish_rules(DEFAULT_BONUS)).unwrap(),
            opts,
        );
        ChatOrchestrator::new(
            Arc::new(retriever),
            PromptAssembler::default(),
            llm,
            ChatDefaults {
                completion_timeout,
                ..ChatDefaults::default()
            },
        )
    }

    fn mistral_reply(text: &str) -> serde_json::Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": text } }] })
    }

    #[tokio::test]
    async fn answers_with_context_and_defaults() {
        let llm = FakeLlm::new(Reply::Body(mistral_reply("UCI::loop reads stdin.")));
        let o = orchestrator(corpus(), Some(vec![1.0, 0.0]), llm.clone(), Duration::from_secs(5));

        let out = o
            .chat(ChatRequest::new(vec![ChatMessage::user("explain uci")]))
            .await
            .unwrap();

        assert_eq!(out.retrieved, ["... uci::loop ..."]);
        assert_eq!(out.reply, "UCI::loop reads stdin.");
        assert_eq!(out.completion, mistral_reply("UCI::loop reads stdin."));

        let (messages, opts) = llm.seen();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert!(messages[0].content.contains("uci.cpp (lines 1-40)"));
        assert_eq!(messages[1], ChatMessage::user("explain uci"));
        assert_eq!(opts.model.as_deref(), Some("codestral-latest"));
        assert_eq!(opts.max_tokens, Some(256));
    }

    #[tokio::test]
    async fn request_overrides_model_and_tokens() {
        let llm = FakeLlm::new(Reply::Body(mistral_reply("ok")));
        let o = orchestrator(corpus(), Some(vec![1.0, 0.0]), llm.clone(), Duration::from_secs(5));

        let mut req = ChatRequest::new(vec![ChatMessage::user("hi")]);
        req.model = Some("mistral-large-latest".into());
        req.max_tokens = Some(32);
        o.chat(req).await.unwrap();

        let (_, opts) = llm.seen();
        assert_eq!(opts.model.as_deref(), Some("mistral-large-latest"));
        assert_eq!(opts.max_tokens, Some(32));
    }

    #[tokio::test]
    async fn embedding_failure_still_answers_without_context() {
        let llm = FakeLlm::new(Reply::Body(mistral_reply("general answer")));
        let o = orchestrator(corpus(), None, llm.clone(), Duration::from_secs(5));

        let out = o
            .chat(ChatRequest::new(vec![ChatMessage::user("explain uci")]))
            .await
            .unwrap();
        assert!(out.retrieved.is_empty());
        assert_eq!(out.reply, "general answer");
        assert!(llm.seen().0[0].content.contains("No relevant Stockfish context found"));
    }

    #[tokio::test]
    async fn missing_reply_uses_placeholder() {
        let llm = FakeLlm::new(Reply::Body(json!({ "choices": [] })));
        let o = orchestrator(corpus(), Some(vec![1.0, 0.0]), llm, Duration::from_secs(5));

        let out = o.chat(ChatRequest::default()).await.unwrap();
        assert_eq!(out.reply, NO_REPLY_PLACEHOLDER);
        assert_eq!(out.completion, json!({ "choices": [] }));
    }

    #[tokio::test]
    async fn completion_failure_is_request_error() {
        let llm = FakeLlm::new(Reply::Status(503));
        let o = orchestrator(corpus(), Some(vec![1.0, 0.0]), llm.clone(), Duration::from_secs(5));

        let err = o
            .chat(ChatRequest::new(vec![ChatMessage::user("explain uci")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Completion(_)));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn completion_timeout_is_request_error() {
        let llm = FakeLlm::new(Reply::Hang);
        let o = orchestrator(corpus(), Some(vec![1.0, 0.0]), llm, Duration::from_millis(20));

        let err = o
            .chat(ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::CompletionTimeout(d) if d == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn dimension_mismatch_skips_completion() {
        let llm = FakeLlm::new(Reply::Body(mistral_reply("never")));
        let o = orchestrator(corpus(), Some(vec![1.0, 0.0, 0.0]), llm.clone(), Duration::from_secs(5));

        let err = o
            .chat(ChatRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChatError::Retrieval(RetrieveError::DimensionMismatch(DimensionMismatch {
                left: 3,
                right: 2
            }))
        ));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }
}
