use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use crate::config::Settings;
use crate::security::{ClientInfo, SecurityEventKind};
use crate::state::AppState;
use crate::validate::is_valid_origin;

#[derive(Debug, PartialEq, Eq)]
pub enum GuardRejection {
    TooLarge(usize),
    InvalidOrigin(String),
}

impl GuardRejection {
    fn status(&self) -> StatusCode {
        match self {
            GuardRejection::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GuardRejection::InvalidOrigin(_) => StatusCode::FORBIDDEN,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            GuardRejection::TooLarge(_) => "Request too large",
            GuardRejection::InvalidOrigin(_) => "Invalid origin",
        }
    }
}

// Declared size and origin checks; requests without an Origin pass
pub fn inspect(headers: &HeaderMap, settings: &Settings) -> Result<(), GuardRejection> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok());
    if let Some(len) = declared {
        if len > settings.max_body_bytes {
            return Err(GuardRejection::TooLarge(len));
        }
    }

    if settings.allowed_origins.is_empty() {
        return Ok(());
    }
    if let Some(origin) = headers.get(header::ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !is_valid_origin(origin, &settings.allowed_origins) {
            return Err(GuardRejection::InvalidOrigin(origin.to_string()));
        }
    }
    Ok(())
}

pub async fn request_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    match inspect(request.headers(), &state.settings) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            let peer = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr);
            ClientInfo::from_request(request.headers(), peer)
                .event(SecurityEventKind::InvalidInput, format!("{rejection:?}"))
                .emit();

            (rejection.status(), Json(json!({ "error": rejection.message() }))).into_response()
        }
    }
}
