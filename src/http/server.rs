//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the demo handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Put the version gate outermost so every response is stamped
//! - Serve with graceful shutdown

use std::time::Duration;

use axum::{response::IntoResponse, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GateConfig;
use crate::lifecycle::shutdown;
use crate::negotiation::{InvalidApiVersion, VersionOptions};

/// HTTP server fronted by the version gate.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
}

impl HttpServer {
    /// Create a server from configuration.
    pub fn new(config: GateConfig) -> Result<Self, InvalidApiVersion> {
        let options = config.versioning.to_options();
        Self::with_options(config, options)
    }

    /// Create a server with explicit negotiation options, e.g. a callback
    /// strategy that cannot be expressed in a config file.
    pub fn with_options(config: GateConfig, options: VersionOptions) -> Result<Self, InvalidApiVersion> {
        let router = Self::build_router(&config, options)?;
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, options: VersionOptions) -> Result<Router, InvalidApiVersion> {
        let app = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        crate::http::register(app, options)
    }

    /// Run the server until `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_version = self.config.versioning.api_version.as_deref().unwrap_or("-"),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

async fn root_handler() -> &'static str {
    "Success!"
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
