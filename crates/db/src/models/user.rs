//! Row model for the `users` table.

use passgate_core::types::Timestamp;
use passgate_core::user::User;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- convert to [`User`] and project with
/// [`User::info`] before anything leaves the process.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
