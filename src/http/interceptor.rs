//! Before-handler stage.
//!
//! # States
//! ```text
//! Start → HeaderCheck ─┬─ absent / empty ─────────────→ Continue
//!                      ├─ unreadable (non-ASCII) ─┬─ callback → Resolving
//!                      │                          └─ otherwise → Reject
//!                      └─ declared → Resolving → Decision (Continue | Reject)
//! ```
//!
//! Unversioned clients are always let through. An unreadable header can never
//! equal or satisfy a configured version, but a callback still gets to judge it,
//! decoded byte-for-byte as Latin-1. Callback faults are returned as errors so
//! the caller can take the internal-error path.

use axum::http::{HeaderMap, HeaderName};

use crate::negotiation::{
    Compatibility, CompatibilityOutcome, NegotiationError, Negotiator, RejectReason,
};
use crate::observability::metrics;

/// Header carrying the API version, in both directions.
pub const API_VERSION: HeaderName = HeaderName::from_static("api-version");

/// The client-declared version of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestVersion<'a> {
    /// No header, or an empty one.
    Absent,
    /// Header present but not readable as visible ASCII; the raw bytes.
    Unreadable(&'a [u8]),
    Declared(&'a str),
}

impl<'a> RequestVersion<'a> {
    /// Read the first `api-version` header. Lookup is case-insensitive.
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        let Some(value) = headers.get(&API_VERSION) else {
            return RequestVersion::Absent;
        };

        if value.is_empty() {
            return RequestVersion::Absent;
        }

        match value.to_str() {
            Ok(version) => RequestVersion::Declared(version),
            Err(_) => RequestVersion::Unreadable(value.as_bytes()),
        }
    }
}

/// Decide whether the request may reach its handler.
pub async fn before_handler(
    negotiator: &Negotiator,
    headers: &HeaderMap,
) -> Result<CompatibilityOutcome, NegotiationError> {
    let outcome = match RequestVersion::from_headers(headers) {
        RequestVersion::Absent => {
            metrics::record_negotiation("unversioned");
            return Ok(CompatibilityOutcome::Continue);
        }
        RequestVersion::Unreadable(raw) => match negotiator.compatibility() {
            Compatibility::Callback(_) => resolve(negotiator, &latin1(raw)).await?,
            _ => {
                tracing::debug!("Unreadable api-version header");
                CompatibilityOutcome::Reject(RejectReason::PreconditionFailed)
            }
        },
        RequestVersion::Declared(version) => resolve(negotiator, version).await?,
    };

    match outcome {
        CompatibilityOutcome::Continue => metrics::record_negotiation("compatible"),
        CompatibilityOutcome::Reject(_) => {
            tracing::debug!(
                api_version = negotiator.api_version(),
                method = negotiator.compatibility().label(),
                "Incompatible api-version"
            );
            metrics::record_negotiation("incompatible");
        }
    }

    Ok(outcome)
}

async fn resolve(
    negotiator: &Negotiator,
    version: &str,
) -> Result<CompatibilityOutcome, NegotiationError> {
    negotiator.resolve(version).await.inspect_err(|_| {
        metrics::record_negotiation("fault");
    })
}

fn latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}
