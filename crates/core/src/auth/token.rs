//! Signed bearer tokens: issuance and validation of access/refresh pairs.
//!
//! Both tokens are HS256-signed JWTs carrying a [`Claims`] payload. They differ
//! only in their `typ` claim and lifetime. Validation is a pure function of the
//! token, the signing key and the supplied clock; no store is consulted.

use std::collections::HashSet;
use std::fmt;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::config::{parse_or, required, ConfigError};
use crate::error::CoreError;

/// Minimum accepted signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;
/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_EXPIRY_SECS: i64 = 15 * 60;
/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;
/// Refresh/access lifetime ratio below which a warning is logged.
pub const RECOMMENDED_LIFETIME_RATIO: i64 = 60;
/// Upper bound on either token lifetime: 10 years.
pub const MAX_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Discriminates the two halves of a [`TokenPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the user's id. Parsed leniently so that a missing or
    /// non-string subject is reported as [`TokenError::InvalidSubject`].
    #[serde(default, deserialize_with = "lenient_subject")]
    pub sub: String,
    pub typ: TokenType,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier, keeps tokens minted in the same second distinct.
    pub jti: String,
}

fn lenient_subject<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// An access token and a refresh token minted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Why a token was rejected (or could not be minted).
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("expected {expected} token, got {actual} token")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("token subject is missing or invalid")]
    InvalidSubject,

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Configuration for token signing and lifetimes.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .finish()
    }
}

impl TokenConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var                   | Required | Default  |
    /// |---------------------------|----------|----------|
    /// | `JWT_SECRET`              | **yes**  | --       |
    /// | `JWT_ACCESS_EXPIRY_SECS`  | no       | `900`    |
    /// | `JWT_REFRESH_EXPIRY_SECS` | no       | `604800` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: required("JWT_SECRET")?,
            access_token_expiry_secs: parse_or(
                "JWT_ACCESS_EXPIRY_SECS",
                DEFAULT_ACCESS_EXPIRY_SECS,
            )?,
            refresh_token_expiry_secs: parse_or(
                "JWT_REFRESH_EXPIRY_SECS",
                DEFAULT_REFRESH_EXPIRY_SECS,
            )?,
        })
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                value: "<redacted>".into(),
                reason: format!("must be at least {MIN_SECRET_LENGTH} bytes"),
            });
        }
        if self.access_token_expiry_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_ACCESS_EXPIRY_SECS",
                value: self.access_token_expiry_secs.to_string(),
                reason: "must be positive".into(),
            });
        }
        for (key, secs) in [
            ("JWT_ACCESS_EXPIRY_SECS", self.access_token_expiry_secs),
            ("JWT_REFRESH_EXPIRY_SECS", self.refresh_token_expiry_secs),
        ] {
            if secs > MAX_LIFETIME_SECS {
                return Err(ConfigError::Invalid {
                    key,
                    value: secs.to_string(),
                    reason: format!("must not exceed {MAX_LIFETIME_SECS} seconds"),
                });
            }
        }
        if self.refresh_token_expiry_secs <= self.access_token_expiry_secs {
            return Err(ConfigError::Invalid {
                key: "JWT_REFRESH_EXPIRY_SECS",
                value: self.refresh_token_expiry_secs.to_string(),
                reason: "must be greater than the access token lifetime".into(),
            });
        }
        Ok(())
    }
}

/// Signs and parses bearer tokens with a single process-wide symmetric key.
#[derive(Clone)]
pub struct TokenCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.header.alg)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Build a codec from validated configuration.
    pub fn new(config: &TokenConfig) -> Result<Self, ConfigError> {
        config.check()?;

        let recommended_refresh = config
            .access_token_expiry_secs
            .checked_mul(RECOMMENDED_LIFETIME_RATIO)
            .unwrap_or(i64::MAX);
        if config.refresh_token_expiry_secs < recommended_refresh {
            tracing::warn!(
                access_secs = config.access_token_expiry_secs,
                refresh_secs = config.refresh_token_expiry_secs,
                "Refresh token lifetime is less than {RECOMMENDED_LIFETIME_RATIO}x the access token lifetime"
            );
        }

        // Expiry is checked against the caller's clock in `validate_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Ok(Self {
            header: Header::new(Algorithm::HS256),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: config.access_token_expiry_secs,
            refresh_ttl: config.refresh_token_expiry_secs,
        })
    }

    /// Access token lifetime in seconds.
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.access_ttl
    }

    /// Mint an access/refresh pair for `subject` using the wall clock.
    pub fn issue(&self, subject: &str) -> Result<TokenPair, TokenError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Mint an access/refresh pair as of `now` (UTC Unix seconds).
    pub fn issue_at(&self, subject: &str, now: i64) -> Result<TokenPair, TokenError> {
        if subject.trim().is_empty() {
            return Err(TokenError::InvalidSubject);
        }
        Ok(TokenPair {
            access_token: self.sign(subject, TokenType::Access, now)?,
            refresh_token: self.sign(subject, TokenType::Refresh, now)?,
        })
    }

    fn sign(&self, subject: &str, typ: TokenType, now: i64) -> Result<String, TokenError> {
        let ttl = match typ {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let exp = now
            .checked_add(ttl)
            .ok_or_else(|| TokenError::Signing(format!("expiry overflows at now={now}")))?;
        let claims = Claims {
            sub: subject.to_string(),
            typ,
            exp,
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate `token` as `expected` using the wall clock, returning its subject.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<String, TokenError> {
        self.validate_at(token, expected, Utc::now().timestamp())
    }

    /// Validate `token` as `expected` at time `now`, returning its subject.
    ///
    /// Checks, in order: structure and signature, expiry (a token is rejected
    /// from its `exp` second onwards), type, subject.
    pub fn validate_at(
        &self,
        token: &str,
        expected: TokenType,
        now: i64,
    ) -> Result<String, TokenError> {
        let claims = self.decode_claims(token)?;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }
        if claims.typ != expected {
            return Err(TokenError::WrongType {
                expected,
                actual: claims.typ,
            });
        }
        if claims.sub.trim().is_empty() {
            return Err(TokenError::InvalidSubject);
        }
        Ok(claims.sub)
    }

    /// Verify the signature and parse the claims without checking expiry or type.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// A missing header, a different scheme or an empty token is invalid input,
/// distinct from errors about the token's content.
pub fn bearer_token(header: Option<&str>) -> Result<&str, CoreError> {
    let header = header.ok_or_else(|| CoreError::invalid_input("Missing Authorization header"))?;
    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        CoreError::invalid_input("Invalid Authorization format. Expected: Bearer <token>")
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(CoreError::invalid_input("Bearer token is empty"));
    }
    Ok(token)
}

#[cfg(test)]
pub(crate) fn test_config() -> TokenConfig {
    TokenConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_secs: DEFAULT_ACCESS_EXPIRY_SECS,
        refresh_token_expiry_secs: DEFAULT_REFRESH_EXPIRY_SECS,
    }
}
