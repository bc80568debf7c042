//! Authentication primitives and the flows built on them.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`token`] -- signed access/refresh token issuance and validation.
//! - [`service`] -- register, login, refresh and access validation flows.

pub mod password;
pub mod service;
pub mod token;

pub use password::{PasswordConfig, PasswordHasher};
pub use service::{AuthOutcome, AuthService};
pub use token::{bearer_token, Claims, TokenCodec, TokenConfig, TokenError, TokenPair, TokenType};
