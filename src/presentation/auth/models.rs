//! Authentication DTOs for API requests and responses

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::auth::entities::User;

/// Login request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Username or email address
    #[schema(example = "operator")]
    pub username: String,
    #[schema(example = "Secure@Pass1")]
    pub password: String,
}

/// Register new user request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// 3 to 50 characters: letters, digits and `-._@+`
    #[schema(example = "operator")]
    pub username: String,
    #[schema(example = "operator@example.com")]
    pub email: String,
    /// At least 8 characters with an uppercase letter, a lowercase letter and a digit
    #[schema(example = "Secure@Pass1")]
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    #[schema(example = "operator")]
    pub username: String,
    #[schema(example = "operator@example.com")]
    pub email: String,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.as_uuid(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
        }
    }
}

/// Login response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserDto,
    /// Bearer access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserDto,
}

/// Query parameters of the provider callback
#[derive(Debug, Deserialize, IntoParams)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user denied access
    pub error: Option<String>,
}
