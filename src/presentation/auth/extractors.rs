//! Authentication extractors for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::application::auth::use_cases::ValidateTokenUseCase;
use crate::application::errors::ApplicationError;
use crate::domain::auth::{errors::AuthError, value_objects::{AccessClaims, UserId}};
use crate::presentation::models::application_error_to_response;

/// Authenticated user information from a bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub username: String,
    /// Full claims, needed to revoke the token on logout
    pub claims: AccessClaims,
}

/// State for authentication extractors
#[derive(Clone)]
pub struct AuthState {
    pub validate_token: Arc<ValidateTokenUseCase>,
}

/// Middleware to inject AuthState into request extensions
pub async fn inject_auth_state_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth_state);
    next.run(request).await
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthErrorResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = parts
            .extensions
            .get::<AuthState>()
            .cloned()
            .ok_or_else(|| AuthErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApplicationError::Configuration {
                    message: "Auth state not found in request extensions".to_string(),
                },
            })?;

        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthErrorResponse::unauthorized(AuthError::InvalidToken))?;

        let claims = auth_state
            .validate_token
            .execute(token)
            .await
            .map_err(AuthErrorResponse::unauthorized)?;
        let user_id = claims.user_id().map_err(AuthErrorResponse::unauthorized)?;

        Ok(AuthUser {
            user_id,
            username: claims.name.clone(),
            claims,
        })
    }
}

/// Error response for authentication failures
#[derive(Debug)]
pub struct AuthErrorResponse {
    pub status: StatusCode,
    pub error: ApplicationError,
}

impl AuthErrorResponse {
    fn unauthorized(error: AuthError) -> Self {
        // Storage failures while checking revocation are still server errors
        let status = match error {
            AuthError::DatabaseError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        Self {
            status,
            error: ApplicationError::Authentication(error),
        }
    }
}

impl IntoResponse for AuthErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut response = application_error_to_response(self.error);
        *response.status_mut() = status;
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                axum::http::header::WWW_AUTHENTICATE,
                axum::http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
