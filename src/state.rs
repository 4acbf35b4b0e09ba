use std::sync::Arc;
use crate::config::Settings;
use crate::gemini::{GeminiClient, Generator};
use crate::random::{OsRandomSource, RandomSource};
use crate::rate_limit::RateLimiter;
use crate::responder::Responder;
// app's shared state

pub struct AppState {
    pub settings: Settings,
    pub rate_limiter: Arc<RateLimiter>,
    pub responder: Responder,
}

impl AppState {
    // Production wiring: Gemini when a key is configured, OS randomness
    pub fn new(settings: Settings, client: reqwest::Client) -> Self {
        let generator: Option<Arc<dyn Generator>> = settings.api_key.as_deref().map(|key| {
            Arc::new(GeminiClient::new(
                client,
                key,
                &settings.gemini_base_url,
                &settings.gemini_model,
            )) as Arc<dyn Generator>
        });
        Self::with_parts(settings, generator, Arc::new(OsRandomSource))
    }

    pub fn with_parts(
        settings: Settings,
        generator: Option<Arc<dyn Generator>>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            settings.rate_limit,
            settings.rate_window,
            settings.rate_limit_capacity,
        ));
        let responder = Responder::new(generator, random, settings.responder.clone());

        Self {
            settings,
            rate_limiter,
            responder,
        }
    }

    // External credential present
    pub fn is_configured(&self) -> bool {
        self.responder.is_configured()
    }
}
