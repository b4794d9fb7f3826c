//! Brute-force top-K retrieval over the in-memory corpus.
//!
//! Pipeline per query:
//! 1. empty corpus or `k == 0` → empty result, no provider call;
//! 2. embed the query (timeout + bounded retries); any failure → empty result;
//! 3. score every chunk: cosine similarity + keyword boost;
//! 4. stable sort by score (desc) and keep the first `min(k, len)`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_llm_service::AiLlmError;
use ai_llm_service::error_handler::ProviderErrorKind;
use tracing::{debug, error, warn};

use crate::boost::KeywordBooster;
use crate::corpus::{Corpus, DocumentChunk};
use crate::error::{DimensionMismatch, RetrieveError};
use crate::providers::EmbeddingsProvider;
use crate::similarity::cosine_similarity;

/// A chunk with its final (similarity + boost) score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Arc<DocumentChunk>,
    pub score: f32,
}

/// Up to K chunks, best first; equal scores keep corpus order.
pub type RetrievalResult = Vec<ScoredChunk>;

/// Knobs for [`Retriever`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieverOptions {
    /// K used by [`Retriever::retrieve_default`].
    pub default_k: usize,
    /// Upper bound for one embedding attempt.
    pub embed_timeout: Duration,
    /// Extra attempts after a transient embedding failure.
    pub embed_retries: u32,
    /// Base delay between attempts; grows linearly.
    pub retry_backoff: Duration,
}

impl Default for RetrieverOptions {
    fn default() -> Self {
        Self {
            default_k: 3,
            embed_timeout: Duration::from_secs(30),
            embed_retries: 1,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

/// Scores a shared corpus against queries.
///
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct Retriever {
    corpus: Arc<Corpus>,
    embedder: Arc<dyn EmbeddingsProvider>,
    booster: KeywordBooster,
    opts: RetrieverOptions,
}

impl Retriever {
    pub fn new(
        corpus: Arc<Corpus>,
        embedder: Arc<dyn EmbeddingsProvider>,
        booster: KeywordBooster,
        opts: RetrieverOptions,
    ) -> Self {
        Self {
            corpus,
            embedder,
            booster,
            opts,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn options(&self) -> &RetrieverOptions {
        &self.opts
    }

    /// [`retrieve`](Self::retrieve) with the configured default K.
    pub async fn retrieve_default(&self, query: &str) -> Result<RetrievalResult, RetrieveError> {
        self.retrieve(query, self.opts.default_k).await
    }

    /// Top-`k` chunks for `query`.
    ///
    /// Provider failures are absorbed: the result is simply empty.
    ///
    /// # Errors
    /// [`RetrieveError::DimensionMismatch`] when the query vector does not
    /// match the corpus dimension.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult, RetrieveError> {
        let k = k.min(self.corpus.len());
        if k == 0 {
            debug!(chunks = self.corpus.len(), "retrieval skipped: nothing to select");
            return Ok(Vec::new());
        }

        let Some(qvec) = self.embed_query(query).await else {
            return Ok(Vec::new());
        };

        self.rank(query, &qvec, k)
    }

    /// Scores every chunk against an already embedded query.
    ///
    /// # Errors
    /// [`RetrieveError::DimensionMismatch`] if `qvec` has the wrong length.
    pub fn rank(&self, query: &str, qvec: &[f32], k: usize) -> Result<RetrievalResult, RetrieveError> {
        let started = Instant::now();
        if let Some(dim) = self.corpus.dimension() {
            if dim != qvec.len() {
                let e = DimensionMismatch {
                    left: qvec.len(),
                    right: dim,
                };
                error!(query_dim = qvec.len(), corpus_dim = dim, "query embedding does not match corpus");
                return Err(e.into());
            }
        }

        let query_lc = query.to_lowercase();
        let mut scored = Vec::with_capacity(self.corpus.len());
        for chunk in self.corpus.iter() {
            let sim = cosine_similarity(qvec, &chunk.embedding)?;
            let score = sim + self.booster.boost_lowercased(&query_lc, chunk);
            scored.push(ScoredChunk {
                chunk: Arc::clone(chunk),
                score,
            });
        }

        // `sort_by` is stable: ties keep corpus order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k.min(scored.len()));

        debug!(
            k,
            chunks = self.corpus.len(),
            top_score = scored.first().map(|s| s.score),
            latency_ms = started.elapsed().as_millis(),
            "ranked corpus"
        );
        Ok(scored)
    }

    async fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        let attempts = self.opts.embed_retries.saturating_add(1);
        for attempt in 1..=attempts {
            match tokio::time::timeout(self.opts.embed_timeout, self.embedder.embed(query)).await {
                Ok(Ok(v)) if !v.is_empty() => return Some(v),
                Ok(Ok(_)) => {
                    warn!(attempt, "embedding provider returned an empty vector; no context");
                    return None;
                }
                Ok(Err(e)) if !is_transient(&e) => {
                    warn!(attempt, error = %e, "embedding failed; no context");
                    return None;
                }
                Ok(Err(e)) => warn!(attempt, attempts, error = %e, "embedding attempt failed"),
                Err(_) => warn!(
                    attempt,
                    attempts,
                    timeout_ms = self.opts.embed_timeout.as_millis(),
                    "embedding attempt timed out"
                ),
            }
            if attempt < attempts {
                tokio::time::sleep(self.opts.retry_backoff * attempt).await;
            }
        }
        warn!(attempts, "embedding unavailable; no context");
        None
    }
}

/// Transport errors, timeouts, 429 and 5xx are worth another attempt.
fn is_transient(e: &AiLlmError) -> bool {
    match e {
        AiLlmError::HttpTransport(_) | AiLlmError::Timeout(_) => true,
        AiLlmError::Provider(p) => match &p.kind {
            ProviderErrorKind::HttpStatus(h) => {
                h.status.is_server_error() || h.status.as_u16() == 429
            }
            _ => false,
        },
        _ => false,
    }
}
