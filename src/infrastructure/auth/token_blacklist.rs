//! Revoked access tokens
//!
//! Revocation is keyed by the token's `jti` and kept only as long as the token
//! itself could still validate. The in-process store is per instance: a
//! revocation is not visible to other replicas.

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use std::time::{Duration, Instant};

use crate::domain::auth::errors::AuthError;

#[async_trait]
pub trait TokenBlacklistService: Send + Sync {
    /// Revoke a token id for `ttl`, normally the token's remaining lifetime
    async fn blacklist_token(&self, token_jti: &str, ttl: Duration) -> Result<(), AuthError>;

    async fn is_blacklisted(&self, token_jti: &str) -> Result<bool, AuthError>;
}

/// Each entry stores the instant it stops mattering
struct RevokedUntil;

impl Expiry<String, Instant> for RevokedUntil {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Instant,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(value.saturating_duration_since(created_at))
    }
}

/// moka-backed blacklist living in process memory
///
/// The cache is unbounded: an entry only leaves once its token has expired.
pub struct InMemoryTokenBlacklist {
    revoked: Cache<String, Instant>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        let revoked = Cache::builder().expire_after(RevokedUntil).build();

        Self { revoked }
    }
}

impl Default for InMemoryTokenBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenBlacklistService for InMemoryTokenBlacklist {
    async fn blacklist_token(&self, token_jti: &str, ttl: Duration) -> Result<(), AuthError> {
        if ttl.is_zero() {
            return Ok(());
        }

        self.revoked
            .insert(token_jti.to_string(), Instant::now() + ttl)
            .await;

        tracing::debug!(token_jti = %token_jti, ttl_secs = ttl.as_secs(), "Token revoked");
        Ok(())
    }

    async fn is_blacklisted(&self, token_jti: &str) -> Result<bool, AuthError> {
        Ok(self.revoked.get(token_jti).await.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoked_token_is_reported() {
        let blacklist = InMemoryTokenBlacklist::default();
        blacklist
            .blacklist_token("jti-1", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(blacklist.is_blacklisted("jti-1").await.unwrap());
        assert!(!blacklist.is_blacklisted("jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_expires_with_token() {
        let blacklist = InMemoryTokenBlacklist::default();
        blacklist
            .blacklist_token("short", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(blacklist.is_blacklisted("short").await.unwrap());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!blacklist.is_blacklisted("short").await.unwrap());
    }

    #[tokio::test]
    async fn test_many_revocations_are_all_kept() {
        let blacklist = InMemoryTokenBlacklist::new();
        for i in 0..2_000 {
            blacklist
                .blacklist_token(&format!("jti-{i}"), Duration::from_secs(3600))
                .await
                .unwrap();
        }
        blacklist.revoked.run_pending_tasks().await;

        for i in 0..2_000 {
            assert!(
                blacklist.is_blacklisted(&format!("jti-{i}")).await.unwrap(),
                "jti-{i} was dropped"
            );
        }
    }

    #[tokio::test]
    async fn test_zero_ttl_is_ignored() {
        let blacklist = InMemoryTokenBlacklist::default();
        blacklist
            .blacklist_token("expired", Duration::ZERO)
            .await
            .unwrap();
        assert!(!blacklist.is_blacklisted("expired").await.unwrap());
    }
}
