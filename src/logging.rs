use std::io;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

// RUST_LOG wins, otherwise info
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .json();
        registry.with(layer).init();
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_target(true);
        registry.with(layer).init();
    }
}
