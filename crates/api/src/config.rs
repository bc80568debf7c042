use axum::http::HeaderValue;
use passgate_core::auth::{PasswordConfig, TokenConfig};
use passgate_core::config::{parse_or, ConfigError};

/// Server configuration loaded from environment variables.
///
/// All fields except the token secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Budget for a single credential store call in seconds (default: `5`).
    pub store_timeout_secs: u64,
    /// Token signing key and lifetimes.
    pub token: TokenConfig,
    /// Argon2 cost parameters.
    pub password: PasswordConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8080`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:8081`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `STORE_TIMEOUT_SECS`   | `5`                        |
    ///
    /// See [`TokenConfig::from_env`] and [`PasswordConfig::from_env`] for the rest.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_or("PORT", 8080)?;

        let cors_raw =
            std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:8081".into());
        let cors_origins = parse_origins(&cors_raw)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs: parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            store_timeout_secs: parse_or("STORE_TIMEOUT_SECS", 5)?,
            token: TokenConfig::from_env()?,
            password: PasswordConfig::from_env()?,
        })
    }
}

/// Split a comma-separated origin list, rejecting entries that are not valid header values.
fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                key: "CORS_ORIGINS",
                value: origin.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
