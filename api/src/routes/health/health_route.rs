//! GET /health - liveness plus corpus facts.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub corpus_chunks: usize,
    /// `null` while the corpus is empty.
    pub embedding_dim: Option<usize>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let corpus = state.chat.retriever().corpus();
    Json(HealthResponse {
        status: "ok",
        corpus_chunks: corpus.len(),
        embedding_dim: corpus.dimension(),
    })
}
