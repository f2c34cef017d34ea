//! Structured logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a configured log level.
pub fn default_directive(log_level: &str) -> String {
    let level = log_level.to_ascii_lowercase();
    format!("version_gate={level},tower_http={level}")
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
