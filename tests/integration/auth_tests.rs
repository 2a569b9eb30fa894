//! Authentication integration tests.
//!
//! Tests verify:
//! - Tokens from `/api/get_token` open `/api/recommend`
//! - Missing headers, wrong schemes, bad and expired tokens are rejected
//! - Rejections never reach the backend and never explain themselves

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use places_api::{create_router, PlaceService, RouterConfig, TokenAuthenticator};

use super::test_utils::{body_json, get, named_envelope, MockSearchBackend};

const TEST_SECRET: &str = "test-secret-key-for-token-signing";
const RECOMMEND_URI: &str = "/api/recommend?lat=55.674&lon=37.666";

fn router_for(backend: MockSearchBackend) -> axum::Router {
    create_router(
        PlaceService::new(backend),
        RouterConfig::new(TEST_SECRET).with_tracing(false),
    )
}

fn geo_backend() -> MockSearchBackend {
    MockSearchBackend::new().with_geo(named_envelope(None, &["a", "b", "c"]))
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

async fn assert_unauthorized(authorization: Option<&str>) {
    let backend = geo_backend();
    let router = router_for(backend.clone());

    let response = router
        .oneshot(get(RECOMMEND_URI, authorization))
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        StatusCode::UNAUTHORIZED,
        "authorization={:?}",
        authorization
    );
    assert_eq!(
        body_json(response).await,
        json!({"error": "unauthorized", "message": "Unauthorized", "status": 401})
    );
    assert_eq!(backend.request_count(), 0);
}

// =============================================================================
// Token Issuance
// =============================================================================

#[tokio::test]
async fn test_get_token_then_recommend() {
    let backend = geo_backend();
    let router = router_for(backend.clone());

    let response = router
        .clone()
        .oneshot(get("/api/get_token", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token.split('.').count(), 3);

    let header = format!("Bearer {}", token);
    let response = router
        .oneshot(get(RECOMMEND_URI, Some(header.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn test_issued_token_claims() {
    let router = router_for(MockSearchBackend::new());

    let response = router.oneshot(get("/api/get_token", None)).await.unwrap();
    let token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let claims = TokenAuthenticator::new(TEST_SECRET).verify(&token).unwrap();
    assert_eq!(claims.iss, "todo-app");
    assert_eq!(claims.exp - claims.iat, 3600);
    assert!(claims.iat.abs_diff(now()) <= 5);
}

#[tokio::test]
async fn test_configured_ttl_applies_to_issued_tokens() {
    let router = create_router(
        PlaceService::new(MockSearchBackend::new()),
        RouterConfig::new(TEST_SECRET)
            .with_token_ttl(Duration::from_secs(120))
            .with_tracing(false),
    );

    let response = router.oneshot(get("/api/get_token", None)).await.unwrap();
    let token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let claims = TokenAuthenticator::new(TEST_SECRET).verify(&token).unwrap();
    assert_eq!(claims.exp - claims.iat, 120);
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_missing_header_rejected() {
    assert_unauthorized(None).await;
}

#[tokio::test]
async fn test_wrong_scheme_rejected() {
    let token = TokenAuthenticator::new(TEST_SECRET).issue().unwrap();

    assert_unauthorized(Some("Token xyz")).await;
    assert_unauthorized(Some("")).await;
    assert_unauthorized(Some(format!("Basic {}", token).as_str())).await;
    assert_unauthorized(Some(format!("bearer {}", token).as_str())).await;
    // Valid token without the prefix
    assert_unauthorized(Some(token.as_str())).await;
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    assert_unauthorized(Some("Bearer garbage")).await;
    assert_unauthorized(Some("Bearer ")).await;
    assert_unauthorized(Some("Bearer a.b.c")).await;
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let token = TokenAuthenticator::new("some-other-secret").issue().unwrap();
    assert_unauthorized(Some(format!("Bearer {}", token).as_str())).await;
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let auth = TokenAuthenticator::new(TEST_SECRET);
    let token = auth.issue_at(now() - 7200).unwrap();
    assert_unauthorized(Some(format!("Bearer {}", token).as_str())).await;
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let token = TokenAuthenticator::new(TEST_SECRET).issue().unwrap();
    let mut bytes = token.into_bytes();
    let last = bytes.len() - 1;
    bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    assert_unauthorized(Some(format!("Bearer {}", tampered).as_str())).await;
}

#[tokio::test]
async fn test_auth_checked_before_parameters() {
    // Invalid coordinates without a token still yield 401, not 400
    let router = router_for(MockSearchBackend::new());
    let response = router
        .oneshot(get("/api/recommend?lat=999", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Public Routes
// =============================================================================

#[tokio::test]
async fn test_public_routes_ignore_authorization() {
    let backend = MockSearchBackend::new().with_listing(named_envelope(Some(1), &["a"]));

    for authorization in [None, Some("Bearer garbage")] {
        let router = router_for(backend.clone());
        let response = router
            .oneshot(get("/api/places?page=1", authorization))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
