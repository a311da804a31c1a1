//! Authentication domain entities

use chrono::{DateTime, Utc};

use super::value_objects::*;

/// User aggregate root
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub username: Username,
    pub email: Email,
    /// Hashed password (never expose raw hash)
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(
        user_id: UserId,
        username: Username,
        email: Email,
        password_hash: PasswordHash,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Record a successful sign-in
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            UserId::generate(),
            Username::new("operator".to_string()).unwrap(),
            Email::new("operator@example.com".to_string()).unwrap(),
            PasswordHash::new("hashed_password".to_string()),
        )
    }

    #[test]
    fn test_user_creation() {
        let user = sample_user();
        assert_eq!(user.username.as_str(), "operator");
        assert_eq!(user.created_at, user.updated_at);
        assert!(user.last_login_at.is_none());
    }

    #[test]
    fn test_record_login_sets_timestamp() {
        let mut user = sample_user();
        user.record_login();
        assert!(user.last_login_at.is_some());
        assert!(user.updated_at >= user.created_at);
    }
}
