#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use passgate_api::config::ServerConfig;
use passgate_api::router::build_app_router;
use passgate_api::state::AppState;
use passgate_core::auth::{AuthService, PasswordConfig, PasswordHasher, TokenCodec, TokenConfig};
use passgate_core::store::{CredentialStore, MemoryStore};
use serde_json::Value;
use tower::ServiceExt;

/// Build a test `ServerConfig` with cheap argon2 parameters and a fixed secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8081".parse().unwrap()],
        request_timeout_secs: 30,
        store_timeout_secs: 1,
        token: TokenConfig {
            secret: "integration-test-secret-of-adequate-length".to_string(),
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 604_800,
        },
        password: PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
    }
}

/// Build the full application router over the given store.
///
/// Uses the same `build_app_router` as `main.rs` so tests exercise the
/// production middleware stack.
pub fn build_app_with_store(store: Arc<dyn CredentialStore>) -> Router {
    let config = test_config();
    let hasher = PasswordHasher::new(&config.password).unwrap();
    let codec = TokenCodec::new(&config.token).unwrap();
    let auth = AuthService::new(store, hasher, codec)
        .with_store_timeout(Duration::from_secs(config.store_timeout_secs));

    let state = AppState {
        auth: Arc::new(auth),
    };
    build_app_router(state, &config)
}

/// Build the app over a fresh in-memory store, returning the store for inspection.
pub fn build_test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (build_app_with_store(store.clone()), store)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: &Router, uri: &str, authorization: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: &Router, uri: &str, authorization: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status, then return the parsed body.
pub async fn expect_status(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

/// Register `username` and return the response JSON.
pub async fn register(app: &Router, username: &str, password: &str) -> Value {
    let response = post_json(
        app,
        "/auth/register",
        serde_json::json!({
            "username": username,
            "password": password,
            "email": format!("{username}@example.com"),
        }),
    )
    .await;
    expect_status(response, StatusCode::CREATED).await
}

pub fn bearer(token: &Value) -> String {
    format!("Bearer {}", token.as_str().unwrap())
}
