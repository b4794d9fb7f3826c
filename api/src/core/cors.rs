use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

use crate::error_handler::AppError;

/// CORS for the browser frontend: one origin, GET/POST, JSON + bearer headers.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(origin).map_err(|e| AppError::Config {
        var: "CORS_ORIGIN",
        reason: e.to_string(),
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
