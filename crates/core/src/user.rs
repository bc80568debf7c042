//! User identity record and its public projection.

use chrono::{SubsecRound, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::types::{Timestamp, UserId};

/// Full user record as held by a [`CredentialStore`](crate::store::CredentialStore).
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserInfo`] for external-facing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Build a new user with a fresh time-ordered id and both timestamps set to now.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        // Microsecond precision matches what PostgreSQL stores.
        let now = Utc::now().trunc_subsecs(6);
        Self {
            id: Uuid::now_v7().to_string(),
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Public projection without the password hash.
    pub fn info(&self) -> UserInfo {
        UserInfo::from(self)
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
