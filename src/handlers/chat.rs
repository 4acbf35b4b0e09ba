use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;
use crate::chat::run_turn;
use crate::metrics::REQUEST_TOTAL;
use crate::models::{ChatResponse, RateLimitInfo, StatusDocument};
use crate::security::ClientInfo;
use crate::state::AppState;

fn session_id(headers: &HeaderMap) -> String {
    headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// POST /chat
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    REQUEST_TOTAL.inc();

    let client = ClientInfo::from_request(&headers, Some(peer));
    let span = tracing::info_span!(
        "chat_turn",
        request_id = %Uuid::new_v4(),
        client = %client.masked_key()
    );

    match run_turn(&state, &client, &body).instrument(span).await {
        Ok(outcome) => {
            let reply = outcome.reply();
            Json(ChatResponse {
                message: reply.message.clone(),
                intent: reply.intent.to_string(),
                timestamp: iso_now(),
                session_id: session_id(&headers),
                fallback: outcome.is_fallback(),
            })
            .into_response()
        }
        Err(err) => err.into_response(),
    }
}

// GET /chat
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusDocument> {
    Json(StatusDocument {
        status: "active",
        configured: state.is_configured(),
        message: "Portfolio chatbot is running",
        version: env!("CARGO_PKG_VERSION"),
        capabilities: vec![
            "Portfolio information",
            "Project details",
            "Skills and experience",
            "Contact information",
            "Education background",
        ],
        rate_limit: RateLimitInfo {
            max_requests: state.rate_limiter.max_requests(),
            window_ms: state.rate_limiter.window().as_millis() as u64,
        },
        last_updated: iso_now(),
    })
}
