//! Application-level error type returned by use cases

use thiserror::Error;

use crate::domain::auth::errors::AuthError;
use crate::domain::production::errors::ProductionError;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Authentication(#[from] AuthError),

    #[error(transparent)]
    Production(#[from] ProductionError),

    /// Malformed request body or parameters
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<sqlx::Error> for ApplicationError {
    fn from(e: sqlx::Error) -> Self {
        ApplicationError::Database {
            message: e.to_string(),
        }
    }
}
