//! Authentication repository traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entities::User;
use super::errors::AuthError;
use super::value_objects::{Email, UserId};

/// User repository trait for user persistence
#[async_trait]
pub trait IUserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, AuthError>;

    /// Case-insensitive lookup
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError>;

    /// Insert a new user. Returns `UserAlreadyExists` when the username or email is taken.
    async fn create(&self, user: &User) -> Result<(), AuthError>;

    async fn update_last_login(
        &self,
        user_id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError>;
}
