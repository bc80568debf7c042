//! Credential store contract.
//!
//! The store owns user records. Implementations must enforce username
//! uniqueness atomically inside [`CredentialStore::insert`]; the auth service
//! performs no locking of its own and relies on that guarantee.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::user::User;

/// Failure reported by a [`CredentialStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Insert rejected because the username is already taken.
    #[error("username already exists")]
    Conflict,

    /// The backend could not be reached (connection refused, pool exhausted).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("store error: {0}")]
    Backend(String),
}

/// Durable system of record for user identity and password hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by username (case-sensitive).
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user, failing with [`StoreError::Conflict`] if the
    /// username is taken. The uniqueness check and the write are atomic.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-process store backed by a `HashMap`, keyed by user id.
///
/// Uniqueness is enforced under the write lock, so concurrent inserts of the
/// same username cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Remove a user by id, returning whether a record was deleted.
    pub async fn remove(&self, id: &str) -> bool {
        self.users.write().await.remove(id).is_some()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.username == user.username || u.id == user.id)
        {
            return Err(StoreError::Conflict);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;

    fn user(username: &str) -> User {
        User::new(username.into(), format!("{username}@test.com"), "hash".into())
    }

    #[tokio::test]
    async fn insert_then_find_by_username_and_id() {
        let store = MemoryStore::new();
        let alice = user("alice");
        store.insert(&alice).await.expect("insert should succeed");

        let by_name = store.find_by_username("alice").await.unwrap();
        assert_eq!(by_name.as_ref(), Some(&alice));

        let by_id = store.find_by_id(&alice.id).await.unwrap();
        assert_eq!(by_id, Some(alice));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let store = MemoryStore::new();
        store.insert(&user("alice")).await.unwrap();

        assert!(store.find_by_username("Alice").await.unwrap().is_none());
        store
            .insert(&user("Alice"))
            .await
            .expect("differently cased username is a different user");
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_and_keeps_original() {
        let store = MemoryStore::new();
        let original = user("alice");
        store.insert(&original).await.unwrap();

        let result = store.insert(&user("alice")).await;
        assert_matches!(result, Err(StoreError::Conflict));

        assert_eq!(store.len().await, 1);
        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.id, original.id);
    }

    #[tokio::test]
    async fn concurrent_inserts_admit_exactly_one() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.insert(&user("racer")).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1, "exactly one concurrent insert may win");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn remove_deletes_record() {
        let store = MemoryStore::new();
        let alice = user("alice");
        store.insert(&alice).await.unwrap();

        assert!(store.remove(&alice.id).await);
        assert!(store.is_empty().await);
        assert!(!store.remove(&alice.id).await);
    }
}
