//! Shared API models and error mapping

use axum::{
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::errors::ApplicationError;
use crate::domain::auth::errors::AuthError;
use crate::domain::production::errors::ProductionError;
use crate::infrastructure::health::CheckResult;

/// Error response model
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "VALIDATION_FAILED")]
    pub code: String,

    /// Human-readable error message
    #[schema(example = "Validation failed")]
    pub message: String,

    /// Additional context, e.g. `{"errors": [...]}` for validation failures
    #[schema(example = r#"{"errors": ["Quantity must be at least 1"]}"#)]
    pub details: Option<serde_json::Value>,

    /// Unique request identifier for tracking and support
    pub request_id: Uuid,

    /// Error occurrence timestamp
    #[schema(example = "2025-01-15T10:30:00Z")]
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(code: &str, message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details,
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }
}

/// Plain acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User registered successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` when every check passed
    #[schema(example = "healthy")]
    pub status: String,

    #[schema(example = "0.1.0")]
    pub version: String,

    pub timestamp: DateTime<Utc>,

    /// Result per dependency
    pub checks: BTreeMap<String, CheckResult>,
}

/// JSON body extractor whose rejection uses the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApplicationError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApplicationError {
    fn from(rejection: JsonRejection) -> Self {
        ApplicationError::InvalidRequest {
            message: rejection.body_text(),
        }
    }
}

/// Path parameter extractor whose rejection uses the API error format
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApplicationError))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for ApplicationError {
    fn from(rejection: PathRejection) -> Self {
        ApplicationError::InvalidRequest {
            message: rejection.body_text(),
        }
    }
}

/// HTTP status, error code, client message and details for an error
fn classify(error: &ApplicationError) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    let errors_detail = |errors: &[String]| Some(serde_json::json!({ "errors": errors }));

    match error {
        ApplicationError::Authentication(auth) => match auth {
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND", auth.to_string(), None),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                auth.to_string(),
                None,
            ),
            AuthError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", auth.to_string(), None)
            }
            AuthError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", auth.to_string(), None)
            }
            AuthError::TokenRevoked => {
                (StatusCode::UNAUTHORIZED, "TOKEN_REVOKED", auth.to_string(), None)
            }
            AuthError::UserAlreadyExists => (
                StatusCode::BAD_REQUEST,
                "USER_ALREADY_EXISTS",
                auth.to_string(),
                None,
            ),
            AuthError::RegistrationFailed { errors } => (
                StatusCode::BAD_REQUEST,
                "REGISTRATION_FAILED",
                auth.to_string(),
                errors_detail(errors),
            ),
            AuthError::OAuthFailed { .. } | AuthError::OAuthMissingEmail { .. } => (
                StatusCode::BAD_REQUEST,
                "OAUTH_FAILED",
                auth.to_string(),
                None,
            ),
            AuthError::TokenIssuing { .. }
            | AuthError::Hashing { .. }
            | AuthError::DatabaseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
                None,
            ),
        },
        ApplicationError::Production(production) => match production {
            ProductionError::OrderNotFound { .. }
            | ProductionError::MachineNotFound { .. }
            | ProductionError::JobNotFound { .. } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", production.to_string(), None)
            }
            ProductionError::Validation { errors } => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                production.to_string(),
                errors_detail(errors),
            ),
            ProductionError::UnknownMachine { .. } => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_MACHINE",
                production.to_string(),
                None,
            ),
            ProductionError::InvalidJobOrder { .. } => (
                StatusCode::BAD_REQUEST,
                "INVALID_JOB_ORDER",
                production.to_string(),
                None,
            ),
            ProductionError::DuplicateOrderNumber { .. }
            | ProductionError::DuplicateMachineName { .. } => {
                (StatusCode::CONFLICT, "CONFLICT", production.to_string(), None)
            }
            ProductionError::DatabaseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Internal server error".to_string(),
                None,
            ),
        },
        ApplicationError::InvalidRequest { message } => (
            StatusCode::BAD_REQUEST,
            "INVALID_REQUEST",
            "Invalid request".to_string(),
            Some(serde_json::json!({ "errors": [message] })),
        ),
        ApplicationError::Database { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "Internal server error".to_string(),
            None,
        ),
        ApplicationError::Configuration { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "CONFIGURATION_ERROR",
            "Service configuration error".to_string(),
            None,
        ),
        ApplicationError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error".to_string(),
            None,
        ),
    }
}

/// Convert ApplicationError to HTTP response
pub fn application_error_to_response(error: ApplicationError) -> Response {
    let (status, code, message, details) = classify(&error);

    if status.is_server_error() {
        tracing::error!(
            error = %error,
            http_status = %status,
            error_code = code,
            "Application error mapped to HTTP response"
        );
    } else {
        tracing::warn!(
            error = %error,
            http_status = %status,
            error_code = code,
            "Request rejected"
        );
    }

    (status, Json(ErrorResponse::new(code, message, details))).into_response()
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        application_error_to_response(self)
    }
}
