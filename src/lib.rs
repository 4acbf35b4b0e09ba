pub mod chat;
pub mod config;
pub mod error;
pub mod gemini;
pub mod handlers;
pub mod knowledge;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod random;
pub mod rate_limit;
pub mod responder;
pub mod sanitize;
pub mod security;
pub mod state;
pub mod validate;
