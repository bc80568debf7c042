//! Register / login / refresh / validate orchestration.
//!
//! [`AuthService`] holds no mutable state: every call is a single pass over
//! the credential store, the password hasher and the token codec. Store calls
//! are bounded by a timeout; hashing runs on the blocking pool.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::auth::password::PasswordHasher;
use crate::auth::token::{TokenCodec, TokenPair, TokenType};
use crate::error::CoreError;
use crate::store::{CredentialStore, StoreError};
use crate::types::UserId;
use crate::user::{User, UserInfo};
use crate::validation::validate_registration;

/// Default budget for a single credential store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Successful register/login result.
#[derive(Debug, Clone, Serialize)]
pub struct AuthOutcome {
    pub user: UserInfo,
    pub tokens: TokenPair,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, codec: TokenCodec) -> Self {
        Self {
            store,
            hasher,
            codec,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override the per-call store timeout.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Create an account and sign the new user in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<AuthOutcome, CoreError> {
        validate_registration(username, password, email)?;

        let existing = self
            .store_call("find_by_username", self.store.find_by_username(username))
            .await?;
        if existing.is_some() {
            tracing::info!(username, "Registration rejected: username taken");
            return Err(CoreError::DuplicateUsername);
        }

        let password_hash = self.hash_password(password).await?;
        let user = User::new(username.to_string(), email.to_string(), password_hash);

        // The pre-check above can race; the store's insert is the real guard.
        self.store_call("insert", self.store.insert(&user))
            .await
            .inspect_err(|e| {
                if matches!(e, CoreError::DuplicateUsername) {
                    tracing::info!(username, "Registration lost a uniqueness race");
                }
            })?;

        let tokens = self.codec.issue(&user.id)?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(self.outcome(&user, tokens))
    }

    /// Authenticate with username + password.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthOutcome, CoreError> {
        let Some(user) = self
            .store_call("find_by_username", self.store.find_by_username(username))
            .await?
        else {
            // Match the argon2 cost of a wrong password.
            let _ = self.verify_password(password, self.hasher.dummy_hash()).await;
            tracing::info!(username, "Login failed: unknown username");
            return Err(CoreError::InvalidCredentials);
        };

        if !self.verify_password(password, &user.password_hash).await? {
            tracing::info!(user_id = %user.id, "Login failed: wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        let tokens = self.codec.issue(&user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(self.outcome(&user, tokens))
    }

    /// Exchange a refresh token for a brand-new pair.
    ///
    /// The presented refresh token is not revoked and stays usable until it
    /// expires; there is no server-side token state to record its use.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, CoreError> {
        let subject = self
            .codec
            .validate(refresh_token, TokenType::Refresh)
            .inspect_err(|e| tracing::debug!(error = %e, "Refresh token rejected"))?;

        let user = self.require_user(&subject).await?;
        let tokens = self.codec.issue(&user.id)?;
        tracing::debug!(user_id = %user.id, "Token pair refreshed");
        Ok(tokens)
    }

    /// Check an access token and confirm its subject still exists.
    pub async fn validate_access(&self, access_token: &str) -> Result<UserId, CoreError> {
        let subject = self
            .codec
            .validate(access_token, TokenType::Access)
            .inspect_err(|e| tracing::debug!(error = %e, "Access token rejected"))?;

        let user = self.require_user(&subject).await?;
        Ok(user.id)
    }

    /// Check the credential store under the same timeout as every other call.
    pub async fn store_healthy(&self) -> Result<(), CoreError> {
        self.store_call("health_check", self.store.health_check()).await
    }

    async fn require_user(&self, id: &str) -> Result<User, CoreError> {
        self.store_call("find_by_id", self.store.find_by_id(id))
            .await?
            .ok_or_else(|| {
                tracing::info!(user_id = id, "Token subject no longer exists");
                CoreError::InvalidCredentials
            })
    }

    fn outcome(&self, user: &User, tokens: TokenPair) -> AuthOutcome {
        AuthOutcome {
            user: user.info(),
            tokens,
            expires_in: self.codec.access_token_lifetime_secs(),
        }
    }

    /// Run a store call under the configured timeout.
    async fn store_call<T, F>(&self, op: &'static str, call: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                if !matches!(err, StoreError::Conflict) {
                    tracing::error!(op, error = %err, "Credential store call failed");
                }
                Err(err.into())
            }
            Err(_) => {
                tracing::warn!(
                    op,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Credential store call timed out"
                );
                Err(CoreError::StoreUnavailable(format!(
                    "{op} timed out after {}ms",
                    self.store_timeout.as_millis()
                )))
            }
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, CoreError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| CoreError::Internal(format!("password hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, CoreError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| CoreError::Internal(format!("password verification task failed: {e}")))?
    }
}
