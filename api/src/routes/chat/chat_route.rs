//! POST /chat - answers a conversation with retrieved code context.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::chat::chat_request::{ChatBody, ChatResponse},
};

/// Handler: POST /chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/chat \
///   -H 'content-type: application/json' \
///   -d '{"messages":[{"role":"user","content":"explain uci"}]}'
/// ```
#[instrument(name = "chat", skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(body) = payload?;
    info!(messages = body.messages.len(), model = ?body.model, "chat request");

    let outcome = state.chat.chat(body.into()).await?;
    Ok(Json(outcome.into()))
}
