use chrono::Utc;
use serde_json::Value;
use std::time::Instant;
use crate::error::ChatError;
use crate::metrics::{FALLBACKS, RATE_LIMITED, REJECTED};
use crate::models::ChatRequest;
use crate::responder::{FallbackReason, TurnOutcome};
use crate::sanitize::{sanitize, suspicious_matches};
use crate::security::{ClientInfo, SecurityEventKind};
use crate::state::AppState;
use crate::validate::parse_conversation_history;

/// Run one chat turn from raw request body to reply.
///
/// Order matters: configuration, then the rate limit (which consumes a
/// unit), then body validation, then generation. Errors before generation
/// are returned to the caller; anything after is folded into a
/// `TurnOutcome::Fallback`.
pub async fn run_turn(
    state: &AppState,
    client: &ClientInfo,
    body: &[u8],
) -> Result<TurnOutcome, ChatError> {
    if !state.is_configured() {
        REJECTED.inc();
        return Err(ChatError::Configuration);
    }

    check_rate_limit(state, client)?;

    let request = parse_request(body).map_err(|err| reject(client, err))?;

    let raw = request
        .message
        .as_str()
        .filter(|msg| !msg.is_empty())
        .ok_or_else(|| {
            reject(client, ChatError::validation("Message is required and must be a string"))
        })?;
    audit_content(client, raw, "raw");

    let message = sanitize(raw, state.settings.max_message_chars);
    if message.is_empty() {
        return Err(reject(client, ChatError::validation("Message content is invalid")));
    }
    audit_content(client, &message, "sanitized");

    let history = if request.conversation_history.is_null() {
        Vec::new()
    } else {
        parse_conversation_history(&request.conversation_history).ok_or_else(|| {
            reject(client, ChatError::validation("Conversation history is malformed"))
        })?
    };
    if history.len() > state.settings.max_messages {
        return Err(reject(
            client,
            ChatError::validation("Conversation too long. Please start a new conversation."),
        ));
    }

    let outcome = state.responder.respond(&message, &history).await;
    if let TurnOutcome::Fallback { reason, .. } = &outcome {
        FALLBACKS.inc();
        if *reason != FallbackReason::Sampled {
            client.event(SecurityEventKind::ApiError, reason.to_string()).emit();
        }
    }
    Ok(outcome)
}

fn check_rate_limit(state: &AppState, client: &ClientInfo) -> Result<(), ChatError> {
    let now = Instant::now();
    let status = state.rate_limiter.check_at(&client.masked_key(), now);
    if status.allowed {
        return Ok(());
    }

    RATE_LIMITED.inc();
    client
        .event(
            SecurityEventKind::RateLimit,
            format!("more than {} requests per window", state.rate_limiter.max_requests()),
        )
        .emit();

    let remaining_ms = status
        .reset_at
        .map(|reset| reset.saturating_duration_since(now).as_millis() as i64)
        .unwrap_or_default();
    Err(ChatError::RateLimited {
        retry_after_secs: status.retry_after_secs(now).unwrap_or(1),
        reset_time_ms: Utc::now().timestamp_millis() + remaining_ms,
    })
}

// Body must be a JSON object; field shapes are checked afterwards
fn parse_request(body: &[u8]) -> Result<ChatRequest, ChatError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ChatError::validation("Request body must be valid JSON"))?;
    if !value.is_object() {
        return Err(ChatError::validation("Request body must be a JSON object"));
    }
    serde_json::from_value(value).map_err(|e| ChatError::validation(e.to_string()))
}

fn reject(client: &ClientInfo, err: ChatError) -> ChatError {
    REJECTED.inc();
    client.event(SecurityEventKind::InvalidInput, err.to_string()).emit();
    err
}

// Audit only: suspicious text is logged, never blocked here
fn audit_content(client: &ClientInfo, text: &str, stage: &str) {
    let labels = suspicious_matches(text);
    if !labels.is_empty() {
        client
            .event(
                SecurityEventKind::SuspiciousContent,
                format!("{stage}: {}", labels.join(",")),
            )
            .emit();
    }
}
