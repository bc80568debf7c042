//! HTTP-level tests for the `/auth` endpoints.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use common::{
    bearer, body_json, build_app_with_store, build_test_app, expect_status, get_auth, post_auth,
    post_json, register,
};
use passgate_core::store::{CredentialStore, StoreError};
use passgate_core::user::User;
use serde_json::json;

// ---------------------------------------------------------------------------
// Register
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_returns_user_and_token_pair() {
    let (app, store) = build_test_app();
    let body = register(&app, "alice", "secret").await;

    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"]["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["tokens"]["access_token"].is_string());
    assert!(body["tokens"]["refresh_token"].is_string());
    assert_ne!(body["tokens"]["access_token"], body["tokens"]["refresh_token"]);
    assert_eq!(body["expires_in"], 900);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn duplicate_username_is_conflict() {
    let (app, store) = build_test_app();
    register(&app, "alice", "secret").await;

    let response = post_json(
        &app,
        "/auth/register",
        json!({ "username": "alice", "password": "another", "email": "other@example.com" }),
    )
    .await;
    let body = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(body["code"], "DUPLICATE_USERNAME");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn invalid_registration_lists_field_errors() {
    let (app, store) = build_test_app();
    let response = post_json(
        &app,
        "/auth/register",
        json!({ "username": "", "password": "abc", "email": "not-an-email" }),
    )
    .await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;

    assert_eq!(body["code"], "INVALID_INPUT");
    let fields: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"password"));
    assert!(fields.contains(&"email"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (app, _store) = build_test_app();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from("{\"username\": "))
        .unwrap();
    let response = common::send(&app, request).await;
    let body = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "INVALID_INPUT");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_returns_fresh_tokens() {
    let (app, _store) = build_test_app();
    let registered = register(&app, "alice", "secret").await;

    let response = post_json(
        &app,
        "/auth/login",
        json!({ "username": "alice", "password": "secret" }),
    )
    .await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["user"]["id"], registered["user"]["id"]);
    assert!(body["tokens"]["access_token"].is_string());
    assert_eq!(body["expires_in"], 900);
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_identical() {
    let (app, _store) = build_test_app();
    register(&app, "alice", "secret").await;

    let wrong_password = post_json(
        &app,
        "/auth/login",
        json!({ "username": "alice", "password": "wrong-one" }),
    )
    .await;
    let wrong_password = expect_status(wrong_password, StatusCode::UNAUTHORIZED).await;

    let unknown_user = post_json(
        &app,
        "/auth/login",
        json!({ "username": "nobody", "password": "secret" }),
    )
    .await;
    let unknown_user = expect_status(unknown_user, StatusCode::UNAUTHORIZED).await;

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(wrong_password["code"], "INVALID_CREDENTIALS");
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn refresh_issues_new_pair_for_same_subject() {
    let (app, _store) = build_test_app();
    let registered = register(&app, "alice", "secret").await;
    let refresh_token = &registered["tokens"]["refresh_token"];

    let response = post_auth(&app, "/auth/refresh", &bearer(refresh_token)).await;
    let pair = expect_status(response, StatusCode::OK).await;
    assert!(pair["access_token"].is_string());
    assert!(pair["refresh_token"].is_string());

    let response = get_auth(&app, "/auth/validate", &bearer(&pair["access_token"])).await;
    let body = expect_status(response, StatusCode::OK).await;
    assert_eq!(body["user_id"], registered["user"]["id"]);
}

#[tokio::test]
async fn refresh_requires_bearer_header() {
    let (app, _store) = build_test_app();
    let registered = register(&app, "alice", "secret").await;

    let missing = common::send(
        &app,
        axum::http::Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    let body = expect_status(missing, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "INVALID_INPUT");

    let no_prefix = post_auth(
        &app,
        "/auth/refresh",
        registered["tokens"]["refresh_token"].as_str().unwrap(),
    )
    .await;
    let body = expect_status(no_prefix, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn access_token_cannot_refresh() {
    let (app, _store) = build_test_app();
    let registered = register(&app, "alice", "secret").await;

    let response = post_auth(
        &app,
        "/auth/refresh",
        &bearer(&registered["tokens"]["access_token"]),
    )
    .await;
    let body = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["code"], "WRONG_TOKEN_TYPE");
}

#[tokio::test]
async fn refresh_for_deleted_account_is_rejected() {
    let (app, store) = build_test_app();
    let registered = register(&app, "alice", "secret").await;
    assert!(store.remove(registered["user"]["id"].as_str().unwrap()).await);

    let response = post_auth(
        &app,
        "/auth/refresh",
        &bearer(&registered["tokens"]["refresh_token"]),
    )
    .await;
    let body = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

// ---------------------------------------------------------------------------
// Validate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validate_accepts_get_and_post() {
    let (app, _store) = build_test_app();
    let registered = register(&app, "alice", "secret").await;
    let header = bearer(&registered["tokens"]["access_token"]);

    let via_get = expect_status(get_auth(&app, "/auth/validate", &header).await, StatusCode::OK).await;
    let via_post =
        expect_status(post_auth(&app, "/auth/validate", &header).await, StatusCode::OK).await;

    assert_eq!(via_get["user_id"], registered["user"]["id"]);
    assert_eq!(via_get, via_post);
}

#[tokio::test]
async fn validate_rejects_garbage_and_refresh_tokens() {
    let (app, _store) = build_test_app();
    let registered = register(&app, "alice", "secret").await;

    let garbage = get_auth(&app, "/auth/validate", "Bearer not.a.token").await;
    let body = expect_status(garbage, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["code"], "INVALID_TOKEN");

    let refresh = get_auth(
        &app,
        "/auth/validate",
        &bearer(&registered["tokens"]["refresh_token"]),
    )
    .await;
    let body = expect_status(refresh, StatusCode::UNAUTHORIZED).await;
    assert_eq!(body["code"], "WRONG_TOKEN_TYPE");
}

// ---------------------------------------------------------------------------
// Store outage
// ---------------------------------------------------------------------------

struct DownStore;

#[async_trait]
impl CredentialStore for DownStore {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn insert(&self, _user: &User) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn store_outage_is_retryable_service_unavailable() {
    let app = build_app_with_store(Arc::new(DownStore));
    let response = post_json(
        &app,
        "/auth/login",
        json!({ "username": "alice", "password": "secret" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    let body = body_json(response).await;
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
    assert!(!body.to_string().contains("connection refused"));
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_login_refresh_validate_scenario() {
    let (app, _store) = build_test_app();
    let registered = register(&app, "alice", "secret").await;
    let user_id = registered["user"]["id"].clone();

    let login = post_json(
        &app,
        "/auth/login",
        json!({ "username": "alice", "password": "secret" }),
    )
    .await;
    let login = expect_status(login, StatusCode::OK).await;

    let refreshed = post_auth(
        &app,
        "/auth/refresh",
        &bearer(&login["tokens"]["refresh_token"]),
    )
    .await;
    let refreshed = expect_status(refreshed, StatusCode::OK).await;

    let validated = get_auth(&app, "/auth/validate", &bearer(&refreshed["access_token"])).await;
    let validated = expect_status(validated, StatusCode::OK).await;
    assert_eq!(validated["user_id"], user_id);

    // Refresh does not revoke: the first refresh token still works.
    let again = post_auth(
        &app,
        "/auth/refresh",
        &bearer(&registered["tokens"]["refresh_token"]),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
}
