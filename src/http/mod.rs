//! HTTP binding for version negotiation.
//!
//! # Data Flow
//! ```text
//! Request
//!     → middleware/api_version.rs (ApiVersionService)
//!         → interceptor.rs (before-handler: read header, resolve)
//!         → wrapped Router (only on Continue)
//!         → decorator.rs (before-response: stamp api-version)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - `register` wraps the whole router, so route misses (404) and
//!   middleware-generated errors are stamped too
//! - No API version configured means `register` returns the router as-is

pub mod decorator;
pub mod interceptor;
pub mod middleware;
pub mod reply;
pub mod server;

use axum::Router;
use tower::Layer;

use crate::negotiation::{InvalidApiVersion, Negotiator, VersionOptions};

pub use interceptor::API_VERSION;
pub use middleware::{ApiVersionLayer, ApiVersionService};
pub use reply::{ErrorReply, Reply};
pub use server::HttpServer;

/// Attach version negotiation to `router`.
///
/// When `options` carries no API version the router is returned untouched
/// and no hooks are installed.
pub fn register(router: Router, options: VersionOptions) -> Result<Router, InvalidApiVersion> {
    let Some(negotiator) = Negotiator::from_options(options)? else {
        tracing::debug!("No API version configured, version negotiation disabled");
        return Ok(router);
    };

    tracing::info!(
        api_version = negotiator.api_version(),
        method = negotiator.compatibility().label(),
        "Version negotiation enabled"
    );

    let gated = ApiVersionLayer::new(negotiator).layer(router);
    Ok(Router::new().fallback_service(gated))
}
