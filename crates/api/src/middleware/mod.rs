//! Request extractors for bearer-token authentication.
//!
//! - [`auth::BearerToken`] -- Raw token from the `Authorization` header.
//! - [`auth::AuthUser`] -- Subject of a validated access token.

pub mod auth;
