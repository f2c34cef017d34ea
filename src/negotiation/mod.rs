//! API version negotiation.
//!
//! # Data Flow
//! ```text
//! VersionOptions (startup)
//!     → Negotiator::from_options (validate, pick strategy)
//!     → Arc<Negotiator> shared by both HTTP hooks
//!
//! Per request:
//!     api-version header
//!     → resolver.rs (Strict | SemverRange | Callback)
//!     → comparator.rs / range.rs
//!     → CompatibilityOutcome
//! ```
//!
//! # Design Decisions
//! - Options are validated once; nothing is mutated after startup
//! - No API version configured means no negotiator at all (inert)
//! - Malformed client input fails closed, never errors

pub mod comparator;
pub mod range;
pub mod resolver;

use axum::http::HeaderValue;

pub use comparator::{BoxError, VersionPredicate};
pub use resolver::{Compatibility, CompatibilityOutcome, MethodName, NegotiationError, RejectReason};

/// The configured API version cannot be sent as a header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("api version `{0}` is not a valid header value")]
pub struct InvalidApiVersion(pub String);

/// Startup options for version negotiation.
#[derive(Debug, Clone, Default)]
pub struct VersionOptions {
    /// Server API version. `None` or empty disables negotiation entirely.
    pub api_version: Option<String>,

    /// Strategy used to compare client and server versions.
    pub compatibility: Compatibility,
}

impl VersionOptions {
    /// Options for `api_version` with the default strategy.
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: Some(api_version.into()),
            compatibility: Compatibility::default(),
        }
    }

    pub fn with_compatibility(mut self, compatibility: impl Into<Compatibility>) -> Self {
        self.compatibility = compatibility.into();
        self
    }

    /// Use a synchronous callback as the strategy.
    pub fn with_callback<F>(self, predicate: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.with_compatibility(Compatibility::callback(predicate))
    }
}

/// Validated, immutable negotiation state.
#[derive(Debug)]
pub struct Negotiator {
    api_version: String,
    header_value: HeaderValue,
    compatibility: Compatibility,
}

impl Negotiator {
    /// Build a negotiator, or `None` when no API version is configured.
    pub fn from_options(options: VersionOptions) -> Result<Option<Self>, InvalidApiVersion> {
        let api_version = match options.api_version {
            Some(v) if !v.is_empty() => v,
            _ => return Ok(None),
        };

        let header_value = HeaderValue::from_str(&api_version)
            .map_err(|_| InvalidApiVersion(api_version.clone()))?;

        if matches!(options.compatibility, Compatibility::SemverRange)
            && range::parse_version(&api_version).is_err()
        {
            tracing::warn!(
                api_version = %api_version,
                "API version is not a semantic version; versioned requests will be rejected"
            );
        }

        Ok(Some(Self {
            api_version,
            header_value,
            compatibility: options.compatibility,
        }))
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// The API version as a ready-to-send header value.
    pub fn header_value(&self) -> &HeaderValue {
        &self.header_value
    }

    pub fn compatibility(&self) -> &Compatibility {
        &self.compatibility
    }

    /// Compare a client-declared version against the configured one.
    pub async fn resolve(&self, request_version: &str) -> Result<CompatibilityOutcome, NegotiationError> {
        self.compatibility
            .resolve(request_version, &self.api_version)
            .await
    }
}
