//! Integration tests for `/api/v1/characters` and `/api/v1/profile`.

mod common;

use std::path::Path;

use axum::http::{Method, StatusCode};
use common::{bearer, body_json, get, send};
use forge_api::handlers::profile::MSG_NO_IMAGE;
use forge_core::data_url::{encode, MAX_INLINE_IMAGE_BYTES, TOO_LARGE_MESSAGE};
use serde_json::json;
use sqlx::PgPool;

fn uploaded_files(public_dir: &Path, namespace: &str) -> Vec<String> {
    std::fs::read_dir(public_dir.join("uploads").join(namespace))
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Without a database
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_requires_auth() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::unreachable_pool(), dir.path());

    let response = send(
        app,
        Method::POST,
        "/api/v1/characters",
        Some(json!({ "characterName": "Thalia" })),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversize_portrait_rejects_submission_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::unreachable_pool(), dir.path());

    let small = encode("image/png", b"tiny");
    let huge = encode("image/png", &vec![1u8; MAX_INLINE_IMAGE_BYTES + 1]);
    let portraits = serde_json::to_string(&[small, huge]).unwrap();

    let response = send(
        app,
        Method::POST,
        "/api/v1/characters",
        Some(json!({ "characterName": "Thalia", "maxHP": 27, "portraits": portraits })),
        Some(&bearer(1)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], TOO_LARGE_MESSAGE);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(uploaded_files(dir.path(), "characters").is_empty());

    // The sheet is echoed back so the form keeps the user's input.
    assert_eq!(body["form_data"]["characterName"], "Thalia");
    assert_eq!(body["form_data"]["maxHP"], 27);
}

#[tokio::test]
async fn delete_requires_auth() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::unreachable_pool(), dir.path());

    let response = send(app, Method::DELETE, "/api/v1/characters/1", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_picture_requires_image() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(common::unreachable_pool(), dir.path());

    let response = send(
        app,
        Method::POST,
        "/api/v1/profile/picture",
        Some(json!({ "image_data": "   " })),
        Some(&bearer(1)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], MSG_NO_IMAGE);
}

#[tokio::test]
async fn profile_picture_rejects_non_string_image() {
    let dir = tempfile::tempdir().unwrap();

    for image_data in [json!(42), json!(["data:image/png;base64,AAAA"]), json!(null)] {
        let app = common::build_test_app(common::unreachable_pool(), dir.path());
        let response = send(
            app,
            Method::POST,
            "/api/v1/profile/picture",
            Some(json!({ "image_data": image_data })),
            Some(&bearer(1)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], MSG_NO_IMAGE);
    }
}

// ---------------------------------------------------------------------------
// With a database
// ---------------------------------------------------------------------------

/// Register a user and return its id.
async fn register(app: axum::Router) -> i64 {
    let response = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        Some(json!({
            "username": "ranger",
            "email": "ranger@example.com",
            "password": "longbow",
            "confirm_password": "longbow",
        })),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["user"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn character_lifecycle_keeps_and_adds_portraits(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());
    let token = bearer(register(app.clone()).await);

    // Create with one new image.
    let portraits = serde_json::to_string(&[encode("image/png", b"first")]).unwrap();
    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/characters",
        Some(json!({ "characterName": "Thalia", "maxHP": 27, "portraits": portraits })),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    let first = created["portraits"][0].as_str().unwrap().to_string();
    assert!(first.starts_with("/uploads/characters/"));
    assert_eq!(created["sheet"]["maxHP"], 27);

    // Update without the portraits field keeps the list.
    let response = send(
        app.clone(),
        Method::PUT,
        &format!("/api/v1/characters/{id}"),
        Some(json!({ "characterName": "Thalia the Swift" })),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["portraits"], json!([first]));
    assert_eq!(updated["character_name"], "Thalia the Swift");

    // Keep the first image and add a second.
    let portraits = serde_json::to_string(&json!([first, encode("image/jpeg", b"second")])).unwrap();
    let response = send(
        app.clone(),
        Method::PUT,
        &format!("/api/v1/characters/{id}"),
        Some(json!({ "characterName": "Thalia the Swift", "portraits": portraits })),
        Some(&token),
    )
    .await;
    let updated = body_json(response).await;
    assert_eq!(updated["portraits"][0], first.as_str());
    assert!(updated["portraits"][1]
        .as_str()
        .unwrap()
        .ends_with(".jpeg"));
    assert_eq!(uploaded_files(dir.path(), "characters").len(), 2);

    // An oversize image on edit echoes the sheet and writes nothing.
    let huge = encode("image/png", &vec![1u8; MAX_INLINE_IMAGE_BYTES + 1]);
    let portraits = serde_json::to_string(&json!([first, huge])).unwrap();
    let response = send(
        app.clone(),
        Method::PUT,
        &format!("/api/v1/characters/{id}"),
        Some(json!({ "characterName": "Thalia Reborn", "portraits": portraits })),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["form_data"]["characterName"], "Thalia Reborn");
    assert_eq!(uploaded_files(dir.path(), "characters").len(), 2);

    // Gallery state is the URL-escaped list.
    let response = get(app.clone(), &format!("/api/v1/characters/{id}/gallery")).await;
    let gallery = body_json(response).await;
    let escaped = gallery["data"]["initial_images"].as_str().unwrap();
    let decoded: Vec<String> =
        serde_json::from_str(&urlencoding::decode(escaped).unwrap()).unwrap();
    assert_eq!(decoded.len(), 2);

    // Listing is public.
    let response = get(app.clone(), "/api/v1/characters").await;
    assert_eq!(body_json(response).await["data"][0]["id"], id);

    // Hard delete leaves the files in place.
    let response = send(
        app.clone(),
        Method::DELETE,
        &format!("/api/v1/characters/{id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get(app, &format!("/api/v1/characters/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(uploaded_files(dir.path(), "characters").len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn profile_picture_is_stored_under_user_prefix(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());
    let user_id = register(app.clone()).await;
    let token = bearer(user_id);

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/profile/picture",
        Some(json!({ "image_data": "not a data url" })),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid image format.");

    let response = send(
        app.clone(),
        Method::POST,
        "/api/v1/profile/picture",
        Some(json!({ "image_data": encode("image/png", b"me") })),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let image_url = body_json(response).await["image_url"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(image_url.starts_with(&format!("/uploads/profile-pictures/{user_id}-")));

    let files = uploaded_files(dir.path(), "profile-pictures");
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with(&format!("{user_id}-")));

    let response = send(app, Method::GET, "/api/v1/auth/me", None, Some(&token)).await;
    assert_eq!(body_json(response).await["profile_image"], image_url.as_str());
}
