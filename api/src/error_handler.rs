use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use code_retriever::ChatError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("invalid configuration in {var}: {reason}")]
    Config { var: &'static str, reason: String },

    // --- IO / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Rich HTTP error mapped from lower layers with specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            // startup-only
            AppError::Config { .. }
            | AppError::Bind { .. }
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Http { code, .. } => code,
        }
    }
}

/// `{ "error": <message>, "code": <CODE> }`
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
            code: self.error_code(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

/// Completion problems are upstream failures (502); a dimension mismatch is
/// our own misconfiguration (500).
impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Retrieval(e) => {
                error!(error = %e, "retrieval misconfigured");
                AppError::Http {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "DIMENSION_MISMATCH",
                    message: e.to_string(),
                }
            }
            ChatError::Completion(e) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "COMPLETION_FAILED",
                message: e.to_string(),
            },
            e @ ChatError::CompletionTimeout(_) => AppError::Http {
                status: StatusCode::BAD_GATEWAY,
                code: "COMPLETION_TIMEOUT",
                message: e.to_string(),
            },
        }
    }
}
