//! Argon2id password hashing and verification.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm parameters and salt are embedded in the hash itself.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::{parse_or, ConfigError};
use crate::error::CoreError;

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordConfig {
    /// Load cost parameters from environment variables.
    ///
    /// | Env Var              | Default |
    /// |----------------------|---------|
    /// | `ARGON2_MEMORY_KIB`  | `19456` |
    /// | `ARGON2_ITERATIONS`  | `2`     |
    /// | `ARGON2_PARALLELISM` | `1`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            memory_kib: parse_or("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or("ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or("ARGON2_PARALLELISM", defaults.parallelism)?,
        })
    }
}

/// One-way salted password hasher.
///
/// Cheap to clone; carries the cost parameters and a reference hash made with
/// them (see [`PasswordHasher::dummy_hash`]).
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Build a hasher, rejecting cost parameters argon2 cannot use.
    pub fn new(config: &PasswordConfig) -> Result<Self, CoreError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| CoreError::Internal(format!("invalid argon2 parameters: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "passgate-unknown-account")?;
        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// A valid hash with this hasher's cost parameters that matches no real
    /// password. Verifying against it costs the same as a real mismatch.
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Returns the PHC-formatted hash string (includes algorithm, params, salt, and hash).
    pub fn hash(&self, password: &str) -> Result<String, CoreError> {
        hash_with(&self.argon2, password)
    }

    /// Verify a plaintext password against a stored PHC-formatted hash.
    ///
    /// Returns `Ok(false)` on mismatch. An unparsable stored hash is an
    /// internal error, not a credential error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, CoreError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| CoreError::Internal(format!("stored password hash is invalid: {e}")))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CoreError::Internal(format!(
                "password verification failed: {e}"
            ))),
        }
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test params are valid")
}
