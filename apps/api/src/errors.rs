use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The extractor produced too little text to be worth scoring.
    #[error("Insufficient text extracted ({chars} chars)")]
    InsufficientText { chars: usize },

    #[error("Upstream rate limited")]
    RateLimited,

    #[error("Upstream quota exceeded")]
    QuotaExceeded,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Malformed analysis: {0}")]
    MalformedAnalysis(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited { .. } => AppError::RateLimited,
            LlmError::QuotaExceeded => AppError::QuotaExceeded,
            LlmError::Parse(e) => AppError::MalformedAnalysis(e.to_string()),
            LlmError::EmptyContent => AppError::Upstream("No response from AI".to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// Body rejections (bad JSON, wrong content type, over the body limit) get the
/// same `{error, code}` shape as every other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body is too large.".to_string())
        } else {
            AppError::Validation(rejection.body_text())
        }
    }
}

impl AppError {
    /// Status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::InsufficientText { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_TEXT"),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            AppError::QuotaExceeded => (StatusCode::PAYMENT_REQUIRED, "QUOTA_EXCEEDED"),
            AppError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            AppError::MalformedAnalysis(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_ANALYSIS")
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Validation(msg) | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::InsufficientText { .. } => "Could not extract enough text from the resume. \
                Please try a different file or a text-based PDF."
                .to_string(),
            AppError::RateLimited => {
                "Rate limit exceeded. Please wait a moment and try again.".to_string()
            }
            AppError::QuotaExceeded => "AI usage limit reached. Please try again later.".to_string(),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                "AI analysis failed".to_string()
            }
            AppError::MalformedAnalysis(msg) => {
                tracing::error!("Malformed analysis from AI: {msg}");
                "AI analysis failed".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
