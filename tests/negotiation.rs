//! End-to-end negotiation behavior through an axum router.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use version_gate::negotiation::{Compatibility, VersionOptions, VersionPredicate};

mod common;

use common::{api_version, body_text, inject, inject_bytes, make_router};

#[tokio::test]
async fn test_inert_without_api_version() {
    let router = make_router(VersionOptions::default());

    let res = inject(&router, "/", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(api_version(&res), None);

    // A client header changes nothing when the gate is inert
    let res = inject(&router, "/", Some("gobbledegook")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(api_version(&res), None);

    let res = inject(&router, "/bad", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(api_version(&res), None);
}

#[tokio::test]
async fn test_empty_api_version_is_inert() {
    let options = VersionOptions {
        api_version: Some(String::new()),
        compatibility: Compatibility::Strict,
    };
    let router = make_router(options);

    let res = inject(&router, "/", Some("v1.0.0")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(api_version(&res), None);
}

#[tokio::test]
async fn test_unversioned_request_is_stamped() {
    let router = make_router(VersionOptions::new("v1.0.0"));
    let res = inject(&router, "/", None).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(api_version(&res), Some("v1.0.0"));
    assert_eq!(body_text(res).await, "Success!");
}

#[tokio::test]
async fn test_unversioned_request_passes_every_strategy() {
    for compatibility in [
        Compatibility::Strict,
        Compatibility::SemverRange,
        Compatibility::callback(|_, _| false),
    ] {
        let label = compatibility.label();
        let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(compatibility));
        let res = inject(&router, "/", None).await;
        assert_eq!(res.status(), StatusCode::OK, "strategy {label}");
    }
}

#[tokio::test]
async fn test_empty_header_is_treated_as_absent() {
    let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(Compatibility::Strict));
    let res = inject(&router, "/", Some("")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(api_version(&res), Some("v1.0.0"));
}

#[tokio::test]
async fn test_handler_errors_are_stamped() {
    let router = make_router(VersionOptions::new("v1.0.0"));

    let res = inject(&router, "/bad", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(api_version(&res), Some("v1.0.0"));

    let res = inject(&router, "/crash", None).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api_version(&res), Some("v1.0.0"));

    let res = inject(&router, "/missing", None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(api_version(&res), Some("v1.0.0"));
}

#[tokio::test]
async fn test_strict_exact_match_passes() {
    let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(Compatibility::Strict));
    let res = inject(&router, "/", Some("v1.0.0")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(api_version(&res), Some("v1.0.0"));
}

#[tokio::test]
async fn test_strict_mismatch_is_412() {
    let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(Compatibility::Strict));

    for requested in ["not-v1.0.0", "1.0.0", "^v1.0.0", "V1.0.0"] {
        let res = inject(&router, "/", Some(requested)).await;
        assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED, "requested {requested}");
        assert_eq!(api_version(&res), Some("v1.0.0"));
    }
}

#[tokio::test]
async fn test_rejection_body() {
    let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(Compatibility::Strict));
    let res = inject(&router, "/", Some("v0.1.0")).await;

    let body: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(body["statusCode"], 412);
    assert_eq!(body["error"], "Precondition Failed");
}

#[tokio::test]
async fn test_semver_cases() {
    let cases = [
        ("v1.0.0", "^v1.0.0", StatusCode::OK),
        ("v2.0.0", "^v1.0.0", StatusCode::PRECONDITION_FAILED),
        ("v2.0.0", "gobbledegook", StatusCode::PRECONDITION_FAILED),
        ("v2.0.0", "^v2.x", StatusCode::OK),
        ("v2.3.1", ">=2.0.0 <3.0.0", StatusCode::OK),
        ("v2.3.1", "1.x || 2.x", StatusCode::OK),
        ("v2.3.1", "~2.2.0", StatusCode::PRECONDITION_FAILED),
        ("v2.0.0-beta.1", "*", StatusCode::PRECONDITION_FAILED),
        ("v1.0.0", "^V1.0.0", StatusCode::PRECONDITION_FAILED),
        ("1.0.0", "==1.0.0", StatusCode::PRECONDITION_FAILED),
    ];

    for (server, requested, expected) in cases {
        let router = make_router(VersionOptions::new(server));
        let res = inject(&router, "/", Some(requested)).await;
        assert_eq!(
            res.status(),
            expected,
            "server {server}, requested {requested}"
        );
        assert_eq!(api_version(&res), Some(server));
    }
}

#[tokio::test]
async fn test_unrecognized_method_uses_semver() {
    let router = make_router(
        VersionOptions::new("v1.0.0").with_compatibility(Compatibility::from_name(Some("strcit"))),
    );

    // Strict would reject this; range matching accepts it
    let res = inject(&router, "/", Some("^1.0.0")).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_callback_receives_request_then_configured_version() {
    let seen: Arc<Mutex<Option<(String, String)>>> = Arc::new(Mutex::new(None));
    let record = seen.clone();

    let router = make_router(VersionOptions::new("v1.0.0").with_callback(move |client, server| {
        *record.lock().unwrap() = Some((client.to_string(), server.to_string()));
        true
    }));

    inject(&router, "/", Some("v1.2.3")).await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, Some(("v1.2.3".to_string(), "v1.0.0".to_string())));
}

#[tokio::test]
async fn test_callback_true_passes() {
    let router = make_router(VersionOptions::new("v1.0.0").with_callback(|_, _| true));
    let res = inject(&router, "/", Some("v1.0.0")).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(api_version(&res), Some("v1.0.0"));
}

#[tokio::test]
async fn test_callback_false_is_412() {
    let router = make_router(VersionOptions::new("v1.0.0").with_callback(|_, _| false));
    let res = inject(&router, "/", Some("v1.0.0")).await;

    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(api_version(&res), Some("v1.0.0"));
}

#[tokio::test]
async fn test_callback_error_is_stamped_500() {
    let predicate = VersionPredicate::fallible(|_, _| Err::<bool, _>("policy store offline"));
    let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(predicate));
    let res = inject(&router, "/", Some("v1.0.0")).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api_version(&res), Some("v1.0.0"));
}

#[tokio::test]
async fn test_callback_panic_is_stamped_500() {
    let router = make_router(
        VersionOptions::new("v1.0.0").with_callback(|_, _| panic!("callback exploded")),
    );
    let res = inject(&router, "/", Some("v1.0.0")).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api_version(&res), Some("v1.0.0"));
}

#[tokio::test]
async fn test_non_ascii_header_is_passed_to_callback() {
    let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let record = seen.clone();

    let router = make_router(VersionOptions::new("v1.0.0").with_callback(move |client, _| {
        *record.lock().unwrap() = Some(client.to_string());
        true
    }));

    let res = inject_bytes(&router, "/", b"v1.0.0-\xe9").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(api_version(&res), Some("v1.0.0"));
    assert_eq!(seen.lock().unwrap().as_deref(), Some("v1.0.0-\u{e9}"));
}

#[tokio::test]
async fn test_non_ascii_header_is_412_without_callback() {
    for compatibility in [Compatibility::Strict, Compatibility::SemverRange] {
        let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(compatibility));
        let res = inject_bytes(&router, "/", b"v1.0.0-\xe9").await;
        assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
        assert_eq!(api_version(&res), Some("v1.0.0"));
    }
}

#[tokio::test]
async fn test_async_callback_is_awaited() {
    let predicate = VersionPredicate::from_async(|client, server| async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, Infallible>(client.split('.').next() == server.split('.').next())
    });
    let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(predicate));

    let res = inject(&router, "/", Some("v1.9.9")).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = inject(&router, "/", Some("v2.0.0")).await;
    assert_eq!(res.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(api_version(&res), Some("v1.0.0"));
}

#[tokio::test]
async fn test_repeated_requests_are_idempotent() {
    let router = make_router(VersionOptions::new("v2.0.0"));

    for _ in 0..5 {
        let ok = inject(&router, "/", Some("^v2.x")).await;
        let rejected = inject(&router, "/", Some("^v1.0.0")).await;
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(rejected.status(), StatusCode::PRECONDITION_FAILED);
    }
}

#[tokio::test]
async fn test_concurrent_requests_share_configuration() {
    let router = make_router(VersionOptions::new("v1.0.0").with_compatibility(Compatibility::Strict));

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let requested = if i % 2 == 0 { "v1.0.0" } else { "v0.0.1" };
                let res = inject(&router, "/", Some(requested)).await;
                (i, res.status(), api_version(&res).map(str::to_string))
            })
        })
        .collect();

    for handle in handles {
        let (i, status, header) = handle.await.unwrap();
        let expected = if i % 2 == 0 {
            StatusCode::OK
        } else {
            StatusCode::PRECONDITION_FAILED
        };
        assert_eq!(status, expected);
        assert_eq!(header.as_deref(), Some("v1.0.0"));
    }
}
