//! HTTP surface: `POST /chat` and `GET /health` over a shared [`AppState`].

pub mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use crate::core::app_state::{AppState, ServerConfig};
pub use crate::error_handler::{AppError, AppResult};

use crate::core::cors::cors_layer;
use crate::routes::{chat::chat_route::chat, health::health_route::health};

/// Builds the application router.
///
/// # Errors
/// [`AppError::Config`] when the CORS origin is not a valid header value.
pub fn router(state: AppState, cfg: &ServerConfig) -> AppResult<Router> {
    Ok(Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .layer(cors_layer(&cfg.cors_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Binds `cfg.address` and serves until Ctrl+C.
pub async fn start(state: AppState, cfg: ServerConfig) -> AppResult<()> {
    let app = router(state, &cfg)?;

    let listener = tokio::net::TcpListener::bind(&cfg.address)
        .await
        .map_err(|source| AppError::Bind {
            addr: cfg.address.clone(),
            source,
        })?;
    info!(address = %cfg.address, cors_origin = %cfg.cors_origin, "backend listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
