//! Passgate core: user identity, credential verification and bearer tokens.
//!
//! Transport-agnostic. The HTTP layer lives in `passgate-api`; the PostgreSQL
//! credential store lives in `passgate-db`.

pub mod auth;
pub mod config;
pub mod error;
pub mod store;
pub mod types;
pub mod user;
pub mod validation;
