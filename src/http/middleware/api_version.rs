//! API version gate middleware.
//!
//! # Hook Order
//! ```text
//! request
//!     → interceptor::before_handler
//!         Continue → inner service → Normal | Error (service error)
//!         Reject   → Error (412), inner service never called
//!         fault    → Error (500), inner service never called
//!     → decorator::before_response (always, exactly once)
//!     → response
//! ```
//!
//! The order is fixed by `ApiVersionService::call`, not by how layers happen
//! to be stacked. The service never fails: inner errors become 500 replies so
//! they can still be stamped.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::{Bytes, HttpBody},
    http::{Request, Response},
    response::IntoResponse,
};
use futures_util::future::BoxFuture;
use tower::{Layer, Service, ServiceExt};

use crate::http::reply::{ErrorReply, Reply};
use crate::http::{decorator, interceptor};
use crate::negotiation::{BoxError, CompatibilityOutcome, Negotiator};
use crate::observability::metrics;

/// Layer that wraps a service with version negotiation.
#[derive(Debug, Clone)]
pub struct ApiVersionLayer {
    negotiator: Arc<Negotiator>,
}

impl ApiVersionLayer {
    pub fn new(negotiator: Negotiator) -> Self {
        Self {
            negotiator: Arc::new(negotiator),
        }
    }

    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }
}

impl<S> Layer<S> for ApiVersionLayer {
    type Service = ApiVersionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiVersionService {
            inner,
            negotiator: Arc::clone(&self.negotiator),
        }
    }
}

/// Service produced by [`ApiVersionLayer`].
#[derive(Debug, Clone)]
pub struct ApiVersionService<S> {
    inner: S,
    negotiator: Arc<Negotiator>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ApiVersionService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError>,
    ReqBody: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The inner service is driven to readiness with `oneshot` in `call`,
        // and only if the request gets that far.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let negotiator = Arc::clone(&self.negotiator);
        let inner = self.inner.clone();

        Box::pin(async move {
            let decision = interceptor::before_handler(&negotiator, request.headers()).await;

            let mut reply = match decision {
                Ok(CompatibilityOutcome::Continue) => match inner.oneshot(request).await {
                    Ok(response) => Reply::Normal(response),
                    Err(e) => {
                        let e: BoxError = e.into();
                        tracing::error!(error = %e, "Inner service failed");
                        Reply::Error(ErrorReply::internal())
                    }
                },
                Ok(CompatibilityOutcome::Reject(reason)) => Reply::Error(ErrorReply::from(reason)),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        api_version = negotiator.api_version(),
                        "Version negotiation failed"
                    );
                    Reply::Error(ErrorReply::internal())
                }
            };

            decorator::before_response(&negotiator, &mut reply);
            metrics::record_response(reply.status().as_u16());

            Ok(reply.into_response())
        })
    }
}
