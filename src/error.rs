use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failures surfaced to the caller before a reply is generated.
#[derive(Debug, Error, PartialEq)]
pub enum ChatError {
    #[error("Chatbot is currently not configured. Please reach out by email instead.")]
    Configuration,
    #[error("{0}")]
    Validation(String),
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited {
        retry_after_secs: u64,
        reset_time_ms: i64,
    },
}

impl ChatError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ChatError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::Configuration => StatusCode::SERVICE_UNAVAILABLE,
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ChatError::RateLimited {
                retry_after_secs,
                reset_time_ms,
            } => {
                let body = json!({
                    "error": self.to_string(),
                    "resetTime": reset_time_ms,
                });
                let mut res = (status, Json(body)).into_response();
                res.headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                res
            }
            _ => (status, Json(json!({ "error": self.to_string() }))).into_response(),
        }
    }
}

// Startup configuration problems
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("rate limit must allow at least one request per window")]
    ZeroRateLimit,
    #[error("rate window must be at least one second")]
    ZeroRateWindow,
    #[error("external share must be between 0 and 1, got {0}")]
    ExternalShare(f64),
}
