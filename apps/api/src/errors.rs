#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No usable resume text in any upload")]
    EmptyInput,

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Session not initialized: {0}")]
    NotInitialized(&'static str),

    #[error("No more questions")]
    NoMoreQuestions,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::EmptyInput => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_INPUT",
                "No readable text was extracted from the uploaded PDFs".to_string(),
            ),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model call failed: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_UNAVAILABLE",
                    "The language model could not be reached. Try the same action again."
                        .to_string(),
                )
            }
            AppError::NotInitialized(op) => (
                StatusCode::CONFLICT,
                "NOT_INITIALIZED",
                format!("'{op}' called before the session was started"),
            ),
            AppError::NoMoreQuestions => (
                StatusCode::CONFLICT,
                "NO_MORE_QUESTIONS",
                "All questions have been asked".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
