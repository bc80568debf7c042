//! Bearer-token extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use passgate_core::auth::bearer_token;
use passgate_core::error::CoreError;
use passgate_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// The token from an `Authorization: Bearer <token>` header, unvalidated.
///
/// A missing header or wrong scheme is rejected as invalid input (400), before
/// the token's content is looked at.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| {
                AppError::Core(CoreError::invalid_input(
                    "Authorization header is not valid ASCII",
                ))
            })?),
            None => None,
        };
        let token = bearer_token(header)?;
        Ok(BearerToken(token.to_string()))
    }
}

/// Authenticated user extracted from an access token in the `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id (from the token's `sub` claim, confirmed against the store).
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user_id = state.auth.validate_access(&token).await?;
        Ok(AuthUser { user_id })
    }
}
