//! Version comparators.
//!
//! Every strategy takes `(client_version, server_version)` and answers
//! whether the two are compatible:
//! - [`strict`]: byte-for-byte equality
//! - [`semver_range`]: the server version satisfies the client's range
//! - [`VersionPredicate`]: operator-supplied policy, possibly async or fallible

use futures_util::future::{BoxFuture, FutureExt};
use std::convert::Infallible;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::negotiation::range::{self, ClientRange};

/// Boxed error returned by fallible predicates.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future produced by a [`VersionPredicate`].
pub type PredicateFuture = BoxFuture<'static, Result<bool, BoxError>>;

/// Compatible iff both strings are identical. No normalization.
pub fn strict(client_version: &str, server_version: &str) -> bool {
    client_version == server_version
}

/// Compatible iff `server_version` satisfies the range in `client_version`.
///
/// Malformed input on either side yields `false`.
pub fn semver_range(client_version: &str, server_version: &str) -> bool {
    let range = match ClientRange::parse(client_version) {
        Ok(range) => range,
        Err(e) => {
            tracing::debug!(client_version, error = %e, "Unparseable version range");
            return false;
        }
    };

    let version = match range::parse_version(server_version) {
        Ok(version) => version,
        Err(e) => {
            tracing::debug!(server_version, error = %e, "Configured version is not semver");
            return false;
        }
    };

    range.matches(&version)
}

/// User-supplied compatibility policy.
///
/// Invoked as `predicate(client_version, server_version)`. Synchronous,
/// fallible and asynchronous closures are all accepted; the result is always
/// awaited before a decision is made.
#[derive(Clone)]
pub struct VersionPredicate {
    inner: Arc<dyn Fn(&str, &str) -> PredicateFuture + Send + Sync>,
}

impl VersionPredicate {
    /// Wrap an infallible synchronous predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        Self::fallible(move |client, server| Ok::<_, Infallible>(predicate(client, server)))
    }

    /// Wrap a synchronous predicate that may fail.
    pub fn fallible<F, E>(predicate: F) -> Self
    where
        F: Fn(&str, &str) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let predicate = Arc::new(predicate);
        Self {
            inner: Arc::new(move |client: &str, server: &str| -> PredicateFuture {
                let predicate = Arc::clone(&predicate);
                let (client, server) = (client.to_owned(), server.to_owned());
                async move { predicate(&client, &server).map_err(Into::into) }.boxed()
            }),
        }
    }

    /// Wrap an asynchronous predicate.
    pub fn from_async<F, Fut, E>(predicate: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, E>> + Send + 'static,
        E: Into<BoxError>,
    {
        Self {
            inner: Arc::new(move |client: &str, server: &str| -> PredicateFuture {
                let fut = predicate(client.to_owned(), server.to_owned());
                async move { fut.await.map_err(Into::into) }.boxed()
            }),
        }
    }

    /// Run the predicate. Panics inside user code are reported as errors.
    pub async fn check(&self, client_version: &str, server_version: &str) -> Result<bool, BoxError> {
        let fut = std::panic::catch_unwind(AssertUnwindSafe(|| {
            (self.inner)(client_version, server_version)
        }))
        .map_err(panic_message)?;

        AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .map_err(panic_message)?
    }
}

impl std::fmt::Debug for VersionPredicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionPredicate").finish_non_exhaustive()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> BoxError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("predicate panicked: {message}").into()
}
