//! Dependency health probes

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::domain::auth::{
    entities::User,
    value_objects::{Email, PasswordHash, UserId, Username},
};
use crate::infrastructure::auth::JwtService;

/// Outcome of one probe
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct CheckResult {
    #[schema(example = "healthy")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Key under `checks` in the health response
    fn name(&self) -> &'static str;

    async fn check(&self) -> CheckResult;
}

/// Round-trips `SELECT 1` through the pool
pub struct DatabaseHealthCheck {
    pool: Arc<PgPool>,
}

impl DatabaseHealthCheck {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for DatabaseHealthCheck {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> CheckResult {
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&*self.pool)
            .await
        {
            Ok(_) => CheckResult::healthy(),
            Err(e) => {
                tracing::warn!("Database health check failed: {}", e);
                CheckResult::unhealthy(e.to_string())
            }
        }
    }
}

/// Always healthy, reported when storage is in process memory
pub struct InMemoryHealthCheck;

#[async_trait]
impl HealthCheck for InMemoryHealthCheck {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> CheckResult {
        CheckResult::healthy()
    }
}

/// Issues a probe token and validates it with the live signing settings
pub struct JwtHealthCheck {
    jwt_service: Arc<JwtService>,
}

impl JwtHealthCheck {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }

    fn probe_user() -> Result<User, String> {
        Ok(User::new(
            UserId::generate(),
            Username::new("healthcheck".to_string())?,
            Email::new("healthcheck@localhost.local".to_string())?,
            PasswordHash::new(String::new()),
        ))
    }
}

#[async_trait]
impl HealthCheck for JwtHealthCheck {
    fn name(&self) -> &'static str {
        "jwt"
    }

    async fn check(&self) -> CheckResult {
        let user = match Self::probe_user() {
            Ok(user) => user,
            Err(e) => return CheckResult::unhealthy(e),
        };

        let result = self
            .jwt_service
            .generate_access_token(&user)
            .and_then(|token| self.jwt_service.validate_access_token(&token));

        match result {
            Ok(_) => CheckResult::healthy(),
            Err(e) => {
                tracing::warn!("JWT health check failed: {}", e);
                CheckResult::unhealthy(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;

    #[tokio::test]
    async fn test_jwt_check_healthy_with_valid_settings() {
        let service = Arc::new(JwtService::new(&JwtConfig {
            key: "test-signing-key-at-least-32-characters-long".to_string(),
            issuer: "prodsched".to_string(),
            audience: "prodsched-clients".to_string(),
            expiration_minutes: 60,
        }));
        let result = JwtHealthCheck::new(service).check().await;
        assert!(result.is_healthy());
    }

    #[tokio::test]
    async fn test_jwt_check_unhealthy_when_tokens_expire_immediately() {
        let service = Arc::new(JwtService::new(&JwtConfig {
            key: "test-signing-key-at-least-32-characters-long".to_string(),
            issuer: "prodsched".to_string(),
            audience: "prodsched-clients".to_string(),
            expiration_minutes: -1,
        }));
        let result = JwtHealthCheck::new(service).check().await;
        assert_eq!(result.status, "unhealthy");
    }
}
