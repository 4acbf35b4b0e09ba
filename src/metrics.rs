use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("portfolio_chat_requests_total", "Total number of chat turns received").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("portfolio_chat_rate_limited_total", "Chat turns refused by the rate limiter").unwrap();
    pub static ref REJECTED: Counter =
        register_counter!("portfolio_chat_rejected_total", "Chat turns refused for invalid input or configuration").unwrap();
    pub static ref FALLBACKS: Counter =
        register_counter!("portfolio_chat_fallback_total", "Chat turns answered from local canned replies").unwrap();
    pub static ref EXTERNAL_LATENCY: Histogram = register_histogram!(
        "portfolio_chat_external_latency_seconds",
        "Latency of external model calls in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge =
        register_gauge!("portfolio_chat_rate_limit_entries", "Current number of rate limit windows").unwrap();
}
