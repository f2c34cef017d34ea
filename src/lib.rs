//! API version negotiation for axum services.
//!
//! Clients may declare the API version they speak in an `api-version`
//! request header. The gate compares it with the server's configured version
//! (exact match, semantic range, or a custom predicate), answers `412
//! Precondition Failed` when they are incompatible, and stamps the configured
//! version on every response it lets out, errors included.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use version_gate::negotiation::{Compatibility, VersionOptions};
//!
//! # fn build() -> Result<Router, version_gate::negotiation::InvalidApiVersion> {
//! let app = Router::new().route("/", get(|| async { "Success!" }));
//! let options = VersionOptions::new("v1.4.0").with_compatibility(Compatibility::SemverRange);
//! let app = version_gate::http::register(app, options)?;
//! # Ok(app)
//! # }
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod negotiation;
pub mod observability;

pub use config::GateConfig;
pub use http::{register, HttpServer, API_VERSION};
pub use lifecycle::Shutdown;
pub use negotiation::{Compatibility, VersionOptions, VersionPredicate};
