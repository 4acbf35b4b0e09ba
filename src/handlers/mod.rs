mod chat;
mod guard;
mod health;
mod metrics;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};
use std::sync::Arc;
use crate::state::AppState;

pub use chat::{chat_handler, status_handler};
pub use guard::request_guard;
pub use health::health_handler;
pub use metrics::metrics_handler;

// Routes for the service, guarded chat endpoints plus health and metrics
pub fn router(state: Arc<AppState>) -> Router {
    let chat = Router::new()
        .route("/api/chat", get(status_handler).post(chat_handler))
        .route("/chat", get(status_handler).post(chat_handler))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), request_guard))
        .layer(DefaultBodyLimit::max(state.settings.max_body_bytes));

    Router::new()
        .merge(chat)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::random::FixedRandomSource;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(settings: Settings) -> Router {
        router(Arc::new(AppState::with_parts(
            settings,
            None,
            Arc::new(FixedRandomSource { roll: 0.0, index: 0 }),
        )))
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn foreign_origin_is_refused_by_the_router() {
        let app = app(Settings {
            allowed_origins: vec!["https://portfolio.com".to_string()],
            ..Settings::default()
        });
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::ORIGIN, "https://evil.com")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"message":"hi"}"#))
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(res).await["error"], "Invalid origin");
    }

    #[tokio::test]
    async fn oversized_declared_body_is_refused_by_the_router() {
        let app = app(Settings::default());
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header(header::CONTENT_LENGTH, "20000")
            .body(Body::from(r#"{"message":"hi"}"#))
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json_body(res).await["error"], "Request too large");
    }

    #[tokio::test]
    async fn allowed_origin_reaches_the_status_handler() {
        let app = app(Settings {
            allowed_origins: vec!["https://portfolio.com".to_string()],
            ..Settings::default()
        });
        let req = Request::builder()
            .uri("/chat")
            .header(header::ORIGIN, "https://portfolio.com")
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["status"], "active");
    }
}
