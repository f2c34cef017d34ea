//! Compatibility strategy selection and invocation.
//!
//! # Selection
//! ```text
//! predicate supplied          → Callback
//! method name "strict"        → Strict
//! anything else (incl. typos) → SemverRange
//! ```
//!
//! The typo fallback is long-standing behavior: deployments with a misspelled
//! method keep working with range matching instead of failing at startup.

use axum::http::StatusCode;

use crate::negotiation::comparator::{self, BoxError, VersionPredicate};

/// Error raised while resolving compatibility.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    /// The user predicate returned an error or panicked.
    #[error("compatibility callback failed: {0}")]
    CallbackFault(#[source] BoxError),
}

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    PreconditionFailed,
}

impl RejectReason {
    pub fn status(self) -> StatusCode {
        match self {
            RejectReason::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
        }
    }
}

/// Result of comparing a request version against the configured version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityOutcome {
    Continue,
    Reject(RejectReason),
}

impl CompatibilityOutcome {
    fn from_compatible(compatible: bool) -> Self {
        if compatible {
            CompatibilityOutcome::Continue
        } else {
            CompatibilityOutcome::Reject(RejectReason::PreconditionFailed)
        }
    }
}

/// Method name as spelled in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodName {
    Strict,
    Semver,
    /// Any other spelling. Resolves to range matching.
    Unrecognized(String),
}

impl MethodName {
    /// Parse a method name. Matching is exact and case-sensitive.
    pub fn parse(name: &str) -> Self {
        match name {
            "strict" => MethodName::Strict,
            "semver" => MethodName::Semver,
            other => MethodName::Unrecognized(other.to_string()),
        }
    }
}

/// The compatibility strategy in effect.
#[derive(Debug, Clone, Default)]
pub enum Compatibility {
    Strict,
    #[default]
    SemverRange,
    Callback(VersionPredicate),
}

impl Compatibility {
    /// Strategy for an optional configured method name.
    pub fn from_name(name: Option<&str>) -> Self {
        name.map(MethodName::parse)
            .map(Compatibility::from)
            .unwrap_or_default()
    }

    /// Callback strategy from a synchronous predicate.
    pub fn callback<F>(predicate: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        Compatibility::Callback(VersionPredicate::new(predicate))
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Compatibility::Strict => "strict",
            Compatibility::SemverRange => "semver",
            Compatibility::Callback(_) => "callback",
        }
    }

    /// Compare `request_version` against `configured_version`.
    ///
    /// Predicate failures are returned as errors, never as an outcome.
    pub async fn resolve(
        &self,
        request_version: &str,
        configured_version: &str,
    ) -> Result<CompatibilityOutcome, NegotiationError> {
        let compatible = match self {
            Compatibility::Strict => comparator::strict(request_version, configured_version),
            Compatibility::SemverRange => comparator::semver_range(request_version, configured_version),
            Compatibility::Callback(predicate) => predicate
                .check(request_version, configured_version)
                .await
                .map_err(NegotiationError::CallbackFault)?,
        };

        Ok(CompatibilityOutcome::from_compatible(compatible))
    }
}

impl From<MethodName> for Compatibility {
    fn from(name: MethodName) -> Self {
        match name {
            MethodName::Strict => Compatibility::Strict,
            MethodName::Semver => Compatibility::SemverRange,
            MethodName::Unrecognized(name) => {
                tracing::warn!(
                    method = %name,
                    "Unrecognized compatibility method, falling back to semver"
                );
                Compatibility::SemverRange
            }
        }
    }
}

impl From<VersionPredicate> for Compatibility {
    fn from(predicate: VersionPredicate) -> Self {
        Compatibility::Callback(predicate)
    }
}
