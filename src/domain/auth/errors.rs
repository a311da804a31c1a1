//! Authentication domain errors

use thiserror::Error;

/// Authentication-specific domain errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid token provided")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Username or email already exists")]
    UserAlreadyExists,

    #[error("Registration failed")]
    RegistrationFailed { errors: Vec<String> },

    #[error("OAuth authentication failed: {reason}")]
    OAuthFailed { reason: String },

    #[error("No email returned from {provider}")]
    OAuthMissingEmail { provider: String },

    #[error("Token issuing failed: {message}")]
    TokenIssuing { message: String },

    #[error("Password hashing failed: {message}")]
    Hashing { message: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },
}
