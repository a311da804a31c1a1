//! Password hashing service using Argon2id

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash as Argon2Hash, PasswordHasher as Argon2Hasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};

use crate::domain::auth::{errors::AuthError, value_objects::PasswordHash};

/// Argon2id hasher
///
/// Hashing and verification run on the blocking pool so concurrent logins
/// do not starve the runtime.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// 19 MiB memory cost
    const MEMORY_COST: u32 = 19_456;
    const TIME_COST: u32 = 2;
    const PARALLELISM: u32 = 1;
    const OUTPUT_LEN: usize = 32;

    pub fn new() -> Self {
        let params = Params::new(
            Self::MEMORY_COST,
            Self::TIME_COST,
            Self::PARALLELISM,
            Some(Self::OUTPUT_LEN),
        )
        .unwrap_or_default();

        Self { params }
    }

    /// Custom cost parameters, mainly for fast tests
    pub fn with_params(
        memory_cost: u32,
        time_cost: u32,
        parallelism: u32,
    ) -> Result<Self, AuthError> {
        let params = Params::new(memory_cost, time_cost, parallelism, Some(Self::OUTPUT_LEN))
            .map_err(|e| AuthError::Hashing {
                message: format!("Invalid Argon2 parameters: {}", e),
            })?;

        Ok(Self { params })
    }

    pub async fn hash(&self, password: String) -> Result<PasswordHash, AuthError> {
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|h| h.to_string())
        })
        .await
        .map_err(|e| {
            tracing::error!("Password hash task panicked: {}", e);
            AuthError::Hashing {
                message: "Password hashing failed".to_string(),
            }
        })?
        .map(PasswordHash::from)
        .map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            AuthError::Hashing {
                message: "Password hashing failed".to_string(),
            }
        })
    }

    /// Check a password against a stored PHC string
    ///
    /// Parameters are read from the hash itself, so hashes created with other
    /// costs still verify.
    pub async fn verify(&self, password: String, hash: PasswordHash) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || {
            let parsed_hash = Argon2Hash::new(hash.as_str()).map_err(|e| {
                tracing::error!("Failed to parse password hash: {}", e);
                AuthError::Hashing {
                    message: "Stored password hash is malformed".to_string(),
                }
            })?;

            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok())
        })
        .await
        .map_err(|e| {
            tracing::error!("Password verify task panicked: {}", e);
            AuthError::Hashing {
                message: "Password verification failed".to_string(),
            }
        })?
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
