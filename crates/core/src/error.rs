use serde::Serialize;

use crate::auth::token::{TokenError, TokenType};
use crate::store::StoreError;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("Username already exists")]
    DuplicateUsername,

    /// Unknown user, wrong password and deleted account all collapse here.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for an [`CoreError::InvalidInput`] without field details.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidInput { .. } => "INVALID_INPUT",
            CoreError::DuplicateUsername => "DUPLICATE_USERNAME",
            CoreError::InvalidCredentials => "INVALID_CREDENTIALS",
            CoreError::InvalidToken(_) => "INVALID_TOKEN",
            CoreError::TokenExpired => "TOKEN_EXPIRED",
            CoreError::WrongTokenType { .. } => "WRONG_TOKEN_TYPE",
            CoreError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Only store outages are worth retrying; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::StoreUnavailable(_))
    }
}

impl From<TokenError> for CoreError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => CoreError::TokenExpired,
            TokenError::WrongType { expected, actual } => {
                CoreError::WrongTokenType { expected, actual }
            }
            TokenError::Signing(msg) => CoreError::Internal(format!("token signing failed: {msg}")),
            other @ (TokenError::Malformed(_)
            | TokenError::BadSignature
            | TokenError::InvalidSubject) => CoreError::InvalidToken(other.to_string()),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            // `users.username` is the only unique column besides the primary key.
            StoreError::Conflict => CoreError::DuplicateUsername,
            StoreError::Unavailable(msg) => CoreError::StoreUnavailable(msg),
            StoreError::Backend(msg) => CoreError::Internal(format!("credential store: {msg}")),
        }
    }
}
