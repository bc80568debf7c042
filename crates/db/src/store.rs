//! [`CredentialStore`] backed by PostgreSQL.

use async_trait::async_trait;
use passgate_core::store::{CredentialStore, StoreError};
use passgate_core::user::User;

use crate::repositories::UserRepo;
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Credential store over the `users` table.
///
/// Username uniqueness is enforced by the `uq_users_username` constraint, so
/// concurrent inserts are safe without application-level locking.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let row = UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(row.map(User::from))
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        UserRepo::create(&self.pool, user)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(classify_sqlx_error)
    }
}

/// Classify a sqlx error into the store contract's error kinds.
///
/// - Unique violations map to [`StoreError::Conflict`].
/// - Pool exhaustion and transport failures map to [`StoreError::Unavailable`].
/// - Everything else maps to [`StoreError::Backend`].
pub fn classify_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            tracing::debug!(
                constraint = db_err.constraint().unwrap_or("unknown"),
                "Unique constraint violation"
            );
            StoreError::Conflict
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Backend(err.to_string()),
    }
}
