//! version-gate demo server.
//!
//! Serves a small router behind the API version gate.
//!
//! ```text
//! version-gate --config gate.toml --api-version v1.2.0 --compatibility strict
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use version_gate::config::{read_config, validate_config, ConfigError, GateConfig};
use version_gate::lifecycle::{signals, Shutdown};
use version_gate::observability::{logging, metrics};
use version_gate::HttpServer;

#[derive(Parser)]
#[command(name = "version-gate")]
#[command(about = "HTTP server with API version negotiation", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override versioning.api_version.
    #[arg(long)]
    api_version: Option<String>,

    /// Override versioning.compatibility_method ("strict" or "semver").
    #[arg(long)]
    compatibility: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut GateConfig) {
        if let Some(bind) = &self.bind {
            config.listener.bind_address = bind.clone();
        }
        if let Some(api_version) = &self.api_version {
            config.versioning.api_version = Some(api_version.clone());
        }
        if let Some(method) = &self.compatibility {
            config.versioning.compatibility_method = Some(method.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => GateConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);

    tracing::info!("version-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        api_version = config.versioning.api_version.as_deref().unwrap_or("-"),
        compatibility_method = config.versioning.compatibility_method.as_deref().unwrap_or("semver"),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        let signal = signals::wait_for_signal().await;
        tracing::info!(signal, "Shutdown signal received");
        trigger.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
