//! Authentication controller endpoints

use axum::{
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Json, Redirect, Response},
};
use std::sync::Arc;
use url::Url;

use crate::application::auth::use_cases::{
    CompleteOAuthLoginUseCase, GetProfileUseCase, LoginUseCase, LogoutUseCase,
    RegisterUserUseCase, StartOAuthLoginUseCase,
};
use crate::application::errors::ApplicationError;
use crate::domain::auth::errors::AuthError;
use crate::presentation::auth::extractors::AuthUser;
use crate::presentation::auth::models::*;
use crate::presentation::models::{ApiJson, ErrorResponse, MessageResponse};

/// Path the provider sends the browser back to
pub const OAUTH_CALLBACK_PATH: &str = "/api/auth/oauth-success";

/// State for auth endpoints
#[derive(Clone)]
pub struct AuthAppState {
    pub register_use_case: Arc<RegisterUserUseCase>,
    pub login_use_case: Arc<LoginUseCase>,
    pub profile_use_case: Arc<GetProfileUseCase>,
    pub logout_use_case: Arc<LogoutUseCase>,
    pub start_oauth_use_case: Arc<StartOAuthLoginUseCase>,
    pub complete_oauth_use_case: Arc<CompleteOAuthLoginUseCase>,
    /// Base URL of the dashboard that receives OAuth results
    pub frontend_url: String,
    /// Fixed callback URL; derived from the request host when unset
    pub oauth_redirect_uri: Option<String>,
}

/// Register new user endpoint
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registration successful", body = MessageResponse),
        (status = 400, description = "Duplicate account or validation errors", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AuthAppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApplicationError> {
    state
        .register_use_case
        .execute(request.username, request.email, request.password)
        .await?;

    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// Login endpoint
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AuthAppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApplicationError> {
    let result = state
        .login_use_case
        .execute(&request.username, request.password)
        .await?;

    Ok(Json(LoginResponse {
        user: UserDto::from(&result.user),
        token: result.access_token,
    }))
}

/// Current user endpoint
#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Signed-in user", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    )
)]
pub async fn profile(
    State(state): State<AuthAppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, ApplicationError> {
    let user = state.profile_use_case.execute(&auth.user_id).await?;
    Ok(Json(ProfileResponse {
        user: UserDto::from(&user),
    }))
}

/// Logout endpoint, revokes the presented token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Missing, invalid or revoked token", body = ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<AuthAppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApplicationError> {
    state.logout_use_case.execute(&auth.claims).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// Start Google sign-in
#[utoipa::path(
    get,
    path = "/api/auth/google-login",
    tag = "auth",
    responses(
        (status = 303, description = "Redirect to the Google consent screen")
    )
)]
pub async fn google_login(
    State(state): State<AuthAppState>,
    headers: HeaderMap,
) -> Result<Redirect, ApplicationError> {
    let redirect_uri = callback_uri(&headers, state.oauth_redirect_uri.as_deref())?;
    let authorize_url = state.start_oauth_use_case.execute(&redirect_uri)?;
    Ok(Redirect::to(&authorize_url))
}

/// Google sign-in callback
#[utoipa::path(
    get,
    path = "/api/auth/oauth-success",
    tag = "auth",
    params(OAuthCallbackQuery),
    responses(
        (status = 303, description = "Redirect to the dashboard with `token` or `error`")
    )
)]
pub async fn oauth_success(
    State(state): State<AuthAppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    let (Some(code), Some(oauth_state), None) = (query.code, query.state, query.error.as_ref())
    else {
        tracing::warn!(provider_error = ?query.error, "OAuth callback without a code");
        return frontend_redirect(&state.frontend_url, "error", "OAuth authentication failed");
    };

    match state
        .complete_oauth_use_case
        .execute(&code, &oauth_state)
        .await
    {
        Ok(token) => frontend_redirect(&state.frontend_url, "token", &token),
        Err(e) => {
            tracing::warn!(error = %e, "OAuth sign-in failed");
            frontend_redirect(&state.frontend_url, "error", &oauth_error_message(&e))
        }
    }
}

/// Liveness text endpoint kept for the dashboard
#[utoipa::path(
    get,
    path = "/api/auth/test",
    tag = "auth",
    responses(
        (status = 200, description = "Server is up", body = String)
    )
)]
pub async fn ping() -> &'static str {
    "Server is running successfully!"
}

fn callback_uri(headers: &HeaderMap, configured: Option<&str>) -> Result<String, ApplicationError> {
    if let Some(uri) = configured.filter(|u| !u.trim().is_empty()) {
        return Ok(uri.to_string());
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApplicationError::InvalidRequest {
            message: "Host header is required".to_string(),
        })?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");

    Ok(format!("{}://{}{}", scheme, host, OAUTH_CALLBACK_PATH))
}

fn oauth_error_message(error: &AuthError) -> String {
    match error {
        AuthError::OAuthMissingEmail { provider } => format!("No email returned from {}", provider),
        AuthError::RegistrationFailed { errors } => {
            format!("Failed to create user: {}", errors.join(", "))
        }
        _ => "OAuth authentication failed".to_string(),
    }
}

/// Redirect to `{frontend}/oauth-success?{key}={value}`
fn frontend_redirect(frontend_url: &str, key: &str, value: &str) -> Response {
    let target = format!("{}/oauth-success", frontend_url.trim_end_matches('/'));
    match Url::parse_with_params(&target, &[(key, value)]) {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(e) => {
            tracing::error!(frontend_url, "Invalid frontend URL: {}", e);
            ApplicationError::Configuration {
                message: format!("invalid frontend url: {}", e),
            }
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_callback_uri_prefers_configuration() {
        let headers = HeaderMap::new();
        assert_eq!(
            callback_uri(&headers, Some("https://plant.example.com/cb")).unwrap(),
            "https://plant.example.com/cb"
        );
        assert!(callback_uri(&headers, None).is_err());
    }

    #[test]
    fn test_callback_uri_from_forwarded_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("plant.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(
            callback_uri(&headers, None).unwrap(),
            "https://plant.example.com/api/auth/oauth-success"
        );
    }

    #[test]
    fn test_oauth_error_messages() {
        assert_eq!(
            oauth_error_message(&AuthError::OAuthMissingEmail {
                provider: "Google".to_string()
            }),
            "No email returned from Google"
        );
        assert_eq!(
            oauth_error_message(&AuthError::RegistrationFailed {
                errors: vec!["Invalid email format".to_string()]
            }),
            "Failed to create user: Invalid email format"
        );
        assert_eq!(
            oauth_error_message(&AuthError::InvalidToken),
            "OAuth authentication failed"
        );
    }

    #[test]
    fn test_frontend_redirect_encodes_value() {
        let response = frontend_redirect("http://localhost:5173/", "error", "a b&c");
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        let url = Url::parse(location).unwrap();
        assert_eq!(url.path(), "/oauth-success");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("error".to_string(), "a b&c".to_string())]);
    }
}
