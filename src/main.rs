use clap::Parser;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use portfolio_chat::config::{Args, Settings};
use portfolio_chat::state::AppState;
use portfolio_chat::{handlers, logging, rate_limit};

#[tokio::main]
async fn main() -> ExitCode {
    // parse cli arguments
    let args = Args::parse();
    logging::init_tracing(args.log_json);

    let settings = match Settings::try_from(&args) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let client = match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build http client");
            return ExitCode::FAILURE;
        }
    };

    // creating shared state
    let state = Arc::new(AppState::new(settings, client));

    // spawn the background sweeper
    let sweeper_limiter = Arc::clone(&state.rate_limiter);
    let sweep_interval = state.settings.sweep_interval;
    tokio::spawn(async move {
        rate_limit::sweeper(sweeper_limiter, sweep_interval).await;
    });

    if !state.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set, POST /chat will answer 503");
    }
    tracing::info!(
        rate_limit = state.settings.rate_limit,
        rate_window = ?state.settings.rate_window,
        max_messages = state.settings.max_messages,
        external_share = state.settings.responder.external_share,
        allowed_origins = ?state.settings.allowed_origins,
        "chat settings loaded"
    );

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("portfolio chat running on http://localhost:{}", args.port);
    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!(error = %e, "server stopped");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
