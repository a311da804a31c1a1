//! SQLx implementation of User repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::{
    entities::User,
    errors::AuthError,
    repositories::IUserRepository,
    value_objects::{Email, PasswordHash, UserId, Username},
};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = AuthError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username).map_err(|e| AuthError::DatabaseError {
            message: format!("Stored username is invalid: {}", e),
        })?;
        let email = Email::new(row.email).map_err(|e| AuthError::DatabaseError {
            message: format!("Stored email is invalid: {}", e),
        })?;

        Ok(User {
            user_id: UserId::from(row.id),
            username,
            email,
            password_hash: PasswordHash::from(row.password_hash),
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login_at: row.last_login_at,
        })
    }
}

const SELECT_USER: &str = r#"
    SELECT id, username, email, password_hash, created_at, updated_at, last_login_at
    FROM users
"#;

/// SQLx implementation of User repository
pub struct SqlxUserRepository {
    pool: Arc<PgPool>,
}

impl SqlxUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<User>, AuthError> {
        let sql = format!("{} WHERE {}", SELECT_USER, predicate);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(User::try_from).transpose()
    }
}

fn map_db_error(e: sqlx::Error) -> AuthError {
    tracing::error!("Database error in user repository: {}", e);
    let error_msg = e.to_string();
    if error_msg.contains("relation") && error_msg.contains("does not exist") {
        AuthError::DatabaseError {
            message: format!(
                "Database table 'users' does not exist. Please run migrations: {}",
                error_msg
            ),
        }
    } else {
        AuthError::DatabaseError { message: error_msg }
    }
}

#[async_trait]
impl IUserRepository for SqlxUserRepository {
    #[tracing::instrument(skip(self), fields(user_id = %user_id.as_str()))]
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<User>, AuthError> {
        let sql = format!("{} WHERE id = $1", SELECT_USER);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.fetch_one_where("lower(username) = lower($1)", username.trim())
            .await
    }

    #[tracing::instrument(skip(self), fields(email = %email.as_str()))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError> {
        self.fetch_one_where("lower(email) = lower($1)", email.as_str())
            .await
    }

    #[tracing::instrument(skip(self, user), fields(user_id = %user.user_id.as_str(), username = %user.username))]
    async fn create(&self, user: &User) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at, updated_at, last_login_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.last_login_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error()
                && db_err.is_unique_violation()
            {
                tracing::debug!(
                    constraint = db_err.constraint().unwrap_or_default(),
                    "User insert hit unique constraint"
                );
                return AuthError::UserAlreadyExists;
            }
            map_db_error(e)
        })?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(user_id = %user_id.as_str()))]
    async fn update_last_login(&self, user_id: &UserId, at: DateTime<Utc>) -> Result<(), AuthError> {
        let result = sqlx::query(
            "UPDATE users SET last_login_at = $2, updated_at = $2 WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(at)
        .execute(&*self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}
