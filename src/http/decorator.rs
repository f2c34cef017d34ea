//! Before-response stage.
//!
//! Stamps `api-version` on every reply that leaves the gate. Normal responses
//! and error replies store headers differently, so both sit behind
//! [`ResponseLike`] and the decorator never inspects the concrete shape.

use axum::http::{HeaderName, HeaderValue, Response};

use crate::http::interceptor::API_VERSION;
use crate::http::reply::{ErrorReply, Reply};
use crate::negotiation::Negotiator;

/// Anything a header can be written onto.
pub trait ResponseLike {
    /// Set `name` to `value`, replacing any previous value.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
}

impl<B> ResponseLike for Response<B> {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }
}

impl ResponseLike for ErrorReply {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.output_headers_mut().insert(name, value);
    }
}

impl<B> ResponseLike for Reply<B> {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        match self {
            Reply::Normal(response) => response.set_header(name, value),
            Reply::Error(error) => error.set_header(name, value),
        }
    }
}

/// Write the configured API version onto `response`.
///
/// Status and body are left untouched.
pub fn before_response<R>(negotiator: &Negotiator, response: &mut R)
where
    R: ResponseLike + ?Sized,
{
    response.set_header(API_VERSION, negotiator.header_value().clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::negotiation::VersionOptions;

    fn negotiator() -> Negotiator {
        Negotiator::from_options(VersionOptions::new("v1.0.0"))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_normal_response_is_stamped() {
        let mut reply: Reply = Reply::Normal(Response::new(Body::from("ok")));
        before_response(&negotiator(), &mut reply);

        let response = reply.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[API_VERSION], "v1.0.0");
    }

    #[test]
    fn test_error_reply_is_stamped_in_output_headers() {
        let mut error = ErrorReply::precondition_failed();
        before_response(&negotiator(), &mut error);
        assert_eq!(error.output_headers()[API_VERSION], "v1.0.0");

        let response = Reply::<Body>::Error(error).into_response();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(response.headers()[API_VERSION], "v1.0.0");
    }

    #[test]
    fn test_existing_header_is_replaced() {
        let mut response = Response::new(Body::empty());
        response
            .headers_mut()
            .insert(API_VERSION, HeaderValue::from_static("handler-set"));

        before_response(&negotiator(), &mut response);
        let values: Vec<_> = response.headers().get_all(API_VERSION).iter().collect();
        assert_eq!(values, vec!["v1.0.0"]);
    }
}
