//! Integration tests for the health endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_bytes, body_json, get, post_json};
use serde_json::json;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: /health reports a degraded database
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_unreachable_database() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::unreachable_pool(), dir.path());

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn response_carries_request_id() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::unreachable_pool(), dir.path());

    let response = get(app, "/health").await;
    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header")
        .to_str()
        .unwrap();
    assert_eq!(request_id.len(), 36);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::unreachable_pool(), dir.path());

    let response = get(app, "/no-such-route").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_allows_client_origin() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::unreachable_pool(), dir.path());

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/characters")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:5173");
}

// ---------------------------------------------------------------------------
// Test: static uploads and body limit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stored_uploads_are_served() {
    let dir = tempfile::tempdir().unwrap();
    let characters = dir.path().join("uploads").join("characters");
    std::fs::create_dir_all(&characters).unwrap();
    std::fs::write(characters.join("hero.png"), b"not really a png").unwrap();

    let app = common::build_test_app(common::unreachable_pool(), dir.path());
    let response = get(app, "/uploads/characters/hero.png").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"not really a png");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.max_body_bytes = 1024;
    let app = common::build_test_app_with(common::unreachable_pool(), config);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "a@example.com", "password": "x".repeat(4096) }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
