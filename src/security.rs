use axum::http::HeaderMap;
use std::fmt;
use std::net::SocketAddr;
use crate::rate_limit::mask_client_key;

const MAX_USER_AGENT_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEventKind {
    RateLimit,
    InvalidInput,
    SuspiciousContent,
    ApiError,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityEventKind::RateLimit => "rate_limit",
            SecurityEventKind::InvalidInput => "invalid_input",
            SecurityEventKind::SuspiciousContent => "suspicious_content",
            SecurityEventKind::ApiError => "api_error",
        }
    }
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-only audit record. The client address is masked on construction,
/// the raw address is never stored.
#[derive(Debug, Clone)]
pub struct SecurityEvent {
    pub kind: SecurityEventKind,
    pub masked_ip: String,
    pub user_agent: Option<String>,
    pub details: String,
}

impl SecurityEvent {
    pub fn new(
        kind: SecurityEventKind,
        client_ip: &str,
        user_agent: Option<&str>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            masked_ip: mask_client_key(client_ip),
            user_agent: user_agent.map(|ua| ua.chars().take(MAX_USER_AGENT_CHARS).collect()),
            details: details.into(),
        }
    }

    pub fn emit(&self) {
        tracing::warn!(
            target: "security",
            event_type = %self.kind,
            masked_ip = %self.masked_ip,
            user_agent = self.user_agent.as_deref().unwrap_or(""),
            details = %self.details,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "security event"
        );
    }
}

// Who is calling: raw address for keying plus the user agent for audit
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn from_request(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        Self {
            ip: client_address(headers, peer),
            user_agent: headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    pub fn masked_key(&self) -> String {
        mask_client_key(&self.ip)
    }

    pub fn event(&self, kind: SecurityEventKind, details: impl Into<String>) -> SecurityEvent {
        SecurityEvent::new(kind, &self.ip, self.user_agent.as_deref(), details)
    }
}

// First x-forwarded-for hop, then the socket peer, then "unknown"
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_header_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(client_address(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_peer_then_unknown() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "[2001:db8::1]:443".parse().unwrap();
        assert_eq!(client_address(&headers, Some(peer)), "2001:db8::1");
        assert_eq!(client_address(&headers, None), "unknown");
    }

    #[test]
    fn event_masks_address_and_truncates_agent() {
        let agent = "x".repeat(500);
        let event = SecurityEvent::new(
            SecurityEventKind::SuspiciousContent,
            "192.168.1.100",
            Some(&agent),
            "script_tag",
        );
        assert_eq!(event.masked_ip, "192.168.1.xxx");
        assert_eq!(event.user_agent.unwrap().len(), 200);
        assert_eq!(event.kind.to_string(), "suspicious_content");
    }
}
