//! Outgoing reply representations.
//!
//! A reply is either the handler's own response or an error produced by the
//! version gate. Error replies keep their headers in a separate output map
//! that is copied onto the response when it is rendered.

use axum::{
    body::{Body, Bytes, HttpBody},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::negotiation::{BoxError, RejectReason};

/// An error reply, rendered as a JSON body.
#[derive(Debug, Clone)]
pub struct ErrorReply {
    status: StatusCode,
    message: String,
    output_headers: HeaderMap,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload<'a> {
    status_code: u16,
    error: &'a str,
    message: &'a str,
}

impl ErrorReply {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            output_headers: HeaderMap::new(),
        }
    }

    /// 412 for an incompatible client version.
    pub fn precondition_failed() -> Self {
        Self::new(StatusCode::PRECONDITION_FAILED, "Precondition Failed")
    }

    /// 500 with a generic message; details stay in the logs.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An internal server error occurred",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Headers written onto the rendered response.
    pub fn output_headers(&self) -> &HeaderMap {
        &self.output_headers
    }

    pub fn output_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.output_headers
    }
}

impl From<RejectReason> for ErrorReply {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::PreconditionFailed => ErrorReply::precondition_failed(),
        }
    }
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        let payload = ErrorPayload {
            status_code: self.status.as_u16(),
            error: self.status.canonical_reason().unwrap_or("Unknown"),
            message: &self.message,
        };

        let mut response = (self.status, Json(payload)).into_response();
        response.headers_mut().extend(self.output_headers);
        response
    }
}

/// A reply tagged by the path that produced it.
#[derive(Debug)]
pub enum Reply<B = Body> {
    Normal(Response<B>),
    Error(ErrorReply),
}

impl<B> Reply<B> {
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Normal(response) => response.status(),
            Reply::Error(error) => error.status(),
        }
    }
}

impl<B> IntoResponse for Reply<B>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn into_response(self) -> Response {
        match self {
            Reply::Normal(response) => response.map(Body::new),
            Reply::Error(error) => error.into_response(),
        }
    }
}
