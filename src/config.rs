use clap::Parser;
use std::time::Duration;
use crate::error::ConfigError;
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::responder::ResponderSettings;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "portfolio-chat")]
#[command(about = "Portfolio chat endpoint with canned fallback replies")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Gemini API key; without it POST /chat answers 503
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub gemini_base_url: String,

    // Rate limit max requests per window
    #[arg(long, env = "CHATBOT_RATE_LIMIT", default_value_t = 10)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "CHATBOT_RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // Max number of client keys tracked at once
    #[arg(long, env = "CHATBOT_RATE_LIMIT_CAPACITY", default_value_t = 10_000)]
    pub rate_limit_capacity: usize,

    // Expired window sweep interval in seconds
    #[arg(long, env = "CHATBOT_SWEEP_INTERVAL", default_value_t = 60)]
    pub sweep_interval: u64,

    // Max conversation history turns accepted
    #[arg(long, env = "CHATBOT_MAX_MESSAGES", default_value_t = 20)]
    pub max_messages: usize,

    // Fraction of turns that try the external model first
    #[arg(long, env = "CHATBOT_EXTERNAL_SHARE", default_value_t = 0.7)]
    pub external_share: f64,

    // External model timeout in milliseconds
    #[arg(long, env = "CHATBOT_EXTERNAL_TIMEOUT_MS", default_value_t = 5000)]
    pub external_timeout_ms: u64,

    // Allowed origins (comma-separated), e.g. "https://site.com,*.vercel.app"
    #[arg(long, env = "CHATBOT_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    // Largest accepted request body in bytes
    #[arg(long, env = "CHATBOT_MAX_BODY_BYTES", default_value_t = 10 * 1024)]
    pub max_body_bytes: usize,

    // Emit JSON log lines
    #[arg(long, env = "CHATBOT_LOG_JSON")]
    pub log_json: bool,
}

// Validated runtime settings shared by the handlers
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub rate_limit: u32,
    pub rate_window: Duration,
    pub rate_limit_capacity: usize,
    pub sweep_interval: Duration,
    pub max_messages: usize,
    pub max_message_chars: usize,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
    pub responder: ResponderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit: 10,
            rate_window: Duration::from_secs(60),
            rate_limit_capacity: 10_000,
            sweep_interval: Duration::from_secs(60),
            max_messages: 20,
            max_message_chars: crate::sanitize::DEFAULT_MAX_LENGTH,
            allowed_origins: Vec::new(),
            max_body_bytes: 10 * 1024,
            responder: ResponderSettings::default(),
        }
    }
}

impl TryFrom<&Args> for Settings {
    type Error = ConfigError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        if args.rate_limit == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }
        if args.rate_window == 0 {
            return Err(ConfigError::ZeroRateWindow);
        }
        if !(0.0..=1.0).contains(&args.external_share) {
            return Err(ConfigError::ExternalShare(args.external_share));
        }

        let api_key = args
            .gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let allowed_origins = args
            .allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let defaults = Settings::default();
        Ok(Self {
            api_key,
            gemini_model: args.gemini_model.clone(),
            gemini_base_url: args.gemini_base_url.clone(),
            rate_limit: args.rate_limit,
            rate_window: Duration::from_secs(args.rate_window),
            rate_limit_capacity: args.rate_limit_capacity,
            sweep_interval: Duration::from_secs(args.sweep_interval.max(1)),
            max_messages: args.max_messages,
            allowed_origins,
            max_body_bytes: args.max_body_bytes,
            responder: ResponderSettings {
                external_share: args.external_share,
                external_timeout: Duration::from_millis(args.external_timeout_ms),
                ..defaults.responder
            },
            ..defaults
        })
    }
}
