use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Longest history message accepted, in characters
pub const MAX_HISTORY_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

// One turn of the caller-supplied conversation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }

    // Build from an already validated history element. Timestamps in a
    // format we don't recognise are dropped rather than rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let role = Role::parse(value.get("type")?.as_str()?)?;
        let content = value.get("content")?.as_str()?.to_string();
        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Some(Self {
            role,
            content,
            timestamp,
        })
    }
}

// POST /chat request body. Fields stay loose so bad shapes get a 400 from
// our own validators instead of an extractor rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub conversation_history: Value,
}

// POST /chat response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub intent: String,
    pub timestamp: String,
    pub session_id: String,
    pub fallback: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitInfo {
    pub max_requests: u32,
    pub window_ms: u64,
}

// GET /chat capability document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDocument {
    pub status: &'static str,
    pub configured: bool,
    pub message: &'static str,
    pub version: &'static str,
    pub capabilities: Vec<&'static str>,
    pub rate_limit: RateLimitInfo,
    pub last_updated: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn history_element_keeps_rfc3339_timestamp() {
        let msg = ChatMessage::from_value(&json!({
            "type": "assistant",
            "content": "hi",
            "timestamp": "2025-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.timestamp.unwrap().to_rfc3339(), "2025-01-02T03:04:05+00:00");
    }

    #[test]
    fn history_element_drops_unparseable_timestamp() {
        let msg = ChatMessage::from_value(&json!({
            "type": "user",
            "content": "hi",
            "timestamp": 1700000000
        }))
        .unwrap();
        assert_eq!(msg.timestamp, None);
    }

    #[test]
    fn request_accepts_missing_history() {
        let req: ChatRequest = serde_json::from_value(json!({ "message": "hello" })).unwrap();
        assert_eq!(req.message, json!("hello"));
        assert!(req.conversation_history.is_null());
    }
}
