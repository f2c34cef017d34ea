//! Shared utilities for integration tests.

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower::ServiceExt;
use version_gate::negotiation::VersionOptions;
use version_gate::API_VERSION;

/// Build a router with a success route and a failing route, then register
/// the version gate on it.
pub fn make_router(options: VersionOptions) -> Router {
    let app = Router::new()
        .route("/", get(|| async { "Success!" }))
        .route(
            "/bad",
            get(|| async { (StatusCode::BAD_REQUEST, "Bad Request").into_response() }),
        )
        .route(
            "/crash",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "crashed").into_response() }),
        );

    version_gate::register(app, options).expect("valid api version")
}

/// Send a GET request in-process, optionally with an `api-version` header.
pub async fn inject(router: &Router, path: &str, version: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(path);
    if let Some(version) = version {
        builder = builder.header(API_VERSION, version);
    }

    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a GET request in-process with a raw `api-version` header value.
#[allow(dead_code)]
pub async fn inject_bytes(router: &Router, path: &str, version: &[u8]) -> Response {
    let request = Request::builder()
        .uri(path)
        .header(API_VERSION, HeaderValue::from_bytes(version).unwrap())
        .body(Body::empty())
        .unwrap();

    router.clone().oneshot(request).await.unwrap()
}

/// The `api-version` response header, if any.
#[allow(dead_code)]
pub fn api_version(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(API_VERSION)
        .and_then(|v| v.to_str().ok())
}

/// Collect a response body as a string.
#[allow(dead_code)]
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
