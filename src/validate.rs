use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use serde_json::Value;
use crate::models::{ChatMessage, MAX_HISTORY_CONTENT_CHARS, Role};

const MAX_EMAIL_CHARS: usize = 254;

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email) && email.chars().count() <= MAX_EMAIL_CHARS
}

/// Check a request `Origin` against an allow-list.
///
/// Entries are matched as:
/// - `*` allows everything
/// - `*.example.com` allows `https` origins on any proper subdomain of
///   `example.com`
/// - anything else must equal the serialized origin (scheme, host, port)
///
/// Empty or unparseable origins never match.
pub fn is_valid_origin(origin: &str, allowed: &[String]) -> bool {
    if origin.trim().is_empty() {
        return false;
    }
    let Ok(url) = Url::parse(origin) else {
        return false;
    };

    allowed.iter().any(|rule| origin_matches(&url, rule))
}

fn origin_matches(url: &Url, rule: &str) -> bool {
    if rule == "*" {
        return true;
    }

    if let Some(domain) = rule.strip_prefix("*.") {
        let domain = domain.to_ascii_lowercase();
        return url.scheme() == "https"
            && url
                .host_str()
                .and_then(|host| host.strip_suffix(domain.as_str()))
                .is_some_and(|sub| sub.len() > 1 && sub.ends_with('.'));
    }

    url.origin().ascii_serialization() == rule
}

/// Shape check for caller-supplied history: an array whose elements all
/// carry a `user`/`assistant` type and string content of bounded length.
pub fn validate_conversation_history(history: &Value) -> bool {
    let Some(turns) = history.as_array() else {
        return false;
    };

    turns.iter().all(|turn| {
        let content_ok = turn
            .get("content")
            .and_then(Value::as_str)
            .is_some_and(|content| content.chars().count() <= MAX_HISTORY_CONTENT_CHARS);
        let role_ok = turn
            .get("type")
            .and_then(Value::as_str)
            .and_then(Role::parse)
            .is_some();
        content_ok && role_ok
    })
}

// Typed history, None unless the value passes validation
pub fn parse_conversation_history(history: &Value) -> Option<Vec<ChatMessage>> {
    if !validate_conversation_history(history) {
        return None;
    }
    history
        .as_array()?
        .iter()
        .map(ChatMessage::from_value)
        .collect()
}
