//! Handlers for the `/auth` resource (register, login, refresh, validate).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use passgate_core::auth::{AuthOutcome, TokenPair};
use passgate_core::types::UserId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, BearerToken};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for `/auth/validate`.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub user_id: UserId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create an account. Returns 201 with the user, a token pair and the access
/// token lifetime.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<AuthOutcome>)> {
    let Json(input) = payload?;
    let outcome = state
        .auth
        .register(&input.username, &input.password, &input.email)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /auth/login
///
/// Authenticate with username + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<AuthOutcome>> {
    let Json(input) = payload?;
    let outcome = state.auth.login(&input.username, &input.password).await?;
    Ok(Json(outcome))
}

/// POST /auth/refresh
///
/// Exchange the refresh token in `Authorization: Bearer <token>` for a new pair.
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> AppResult<Json<TokenPair>> {
    let tokens = state.auth.refresh(&token).await?;
    Ok(Json(tokens))
}

/// GET|POST /auth/validate
///
/// Check the access token in `Authorization: Bearer <token>` and return its subject.
pub async fn validate(user: AuthUser) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        user_id: user.user_id,
    })
}
