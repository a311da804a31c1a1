//! Authentication use cases

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::accounts::{generate_secure_password, sanitize_username, username_candidates};
use crate::domain::auth::{
    entities::User,
    errors::AuthError,
    repositories::IUserRepository,
    value_objects::{AccessClaims, Email, Password, PasswordHash, UserId, Username},
};
use crate::infrastructure::auth::{
    JwtService, OAuthProvider, PasswordHasher, TokenBlacklistService,
};

/// Upper bound on `stem1`, `stem2`, ... attempts when deriving a username
const MAX_USERNAME_ATTEMPTS: usize = 1000;

/// Result type for login operations
pub struct LoginResult {
    pub user: User,
    pub access_token: String,
}

/// Use case for registering new users
pub struct RegisterUserUseCase {
    user_repository: Arc<dyn IUserRepository>,
    password_hasher: Arc<PasswordHasher>,
}

impl RegisterUserUseCase {
    pub fn new(
        user_repository: Arc<dyn IUserRepository>,
        password_hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Existing username or email wins over field validation
    pub async fn execute(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, AuthError> {
        if self
            .user_repository
            .find_by_username(username.trim())
            .await?
            .is_some()
        {
            return Err(AuthError::UserAlreadyExists);
        }
        if let Ok(parsed) = Email::new(email.clone())
            && self.user_repository.find_by_email(&parsed).await?.is_some()
        {
            return Err(AuthError::UserAlreadyExists);
        }

        let mut errors = Vec::new();
        let username = Username::new(username).map_err(|e| errors.push(e)).ok();
        let email = Email::new(email).map_err(|e| errors.push(e)).ok();
        if let Err(e) = Password::validate(&password) {
            errors.push(e.message);
        }

        let (Some(username), Some(email)) = (username, email) else {
            return Err(AuthError::RegistrationFailed { errors });
        };
        if !errors.is_empty() {
            return Err(AuthError::RegistrationFailed { errors });
        }

        let password_hash = self.password_hasher.hash(password).await?;
        let user = User::new(UserId::generate(), username, email, password_hash);
        self.user_repository.create(&user).await?;

        tracing::info!(user_id = %user.user_id, username = %user.username, "User registered");
        Ok(user)
    }
}

/// Use case for user login
pub struct LoginUseCase {
    user_repository: Arc<dyn IUserRepository>,
    password_hasher: Arc<PasswordHasher>,
    jwt_service: Arc<JwtService>,
    /// Verified against when the username is unknown so both paths cost the same
    dummy_hash: OnceCell<PasswordHash>,
}

impl LoginUseCase {
    pub fn new(
        user_repository: Arc<dyn IUserRepository>,
        password_hasher: Arc<PasswordHasher>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            jwt_service,
            dummy_hash: OnceCell::new(),
        }
    }

    pub async fn execute(&self, username: &str, password: String) -> Result<LoginResult, AuthError> {
        let Some(mut user) = self.user_repository.find_by_username(username).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.password_hasher.hash("Dummy-Password-0".to_string()))
                .await?;
            let _ = self.password_hasher.verify(password, dummy.clone()).await;

            tracing::warn!(username = %username, "Login attempt for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        let is_valid = self
            .password_hasher
            .verify(password, user.password_hash.clone())
            .await
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !is_valid {
            tracing::warn!(user_id = %user.user_id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        user.record_login();
        if let Some(at) = user.last_login_at {
            self.user_repository
                .update_last_login(&user.user_id, at)
                .await?;
        }

        let access_token = self.jwt_service.generate_access_token(&user)?;
        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginResult { user, access_token })
    }
}

/// Use case for validating bearer tokens
pub struct ValidateTokenUseCase {
    jwt_service: Arc<JwtService>,
    token_blacklist: Arc<dyn TokenBlacklistService>,
}

impl ValidateTokenUseCase {
    pub fn new(
        jwt_service: Arc<JwtService>,
        token_blacklist: Arc<dyn TokenBlacklistService>,
    ) -> Self {
        Self {
            jwt_service,
            token_blacklist,
        }
    }

    pub async fn execute(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let claims = self.jwt_service.validate_access_token(token)?;

        if self.token_blacklist.is_blacklisted(&claims.jti).await? {
            tracing::debug!(token_jti = %claims.jti, "Rejected revoked token");
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }
}

/// Use case for loading the signed-in user's profile
pub struct GetProfileUseCase {
    user_repository: Arc<dyn IUserRepository>,
}

impl GetProfileUseCase {
    pub fn new(user_repository: Arc<dyn IUserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn execute(&self, user_id: &UserId) -> Result<User, AuthError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Use case for revoking the presented token
pub struct LogoutUseCase {
    token_blacklist: Arc<dyn TokenBlacklistService>,
}

impl LogoutUseCase {
    pub fn new(token_blacklist: Arc<dyn TokenBlacklistService>) -> Self {
        Self { token_blacklist }
    }

    /// Revoke until the token would have expired anyway
    pub async fn execute(&self, claims: &AccessClaims) -> Result<(), AuthError> {
        let remaining = (claims.expires_at() - Utc::now())
            .to_std()
            .unwrap_or_default();

        self.token_blacklist
            .blacklist_token(&claims.jti, remaining)
            .await?;

        tracing::info!(user_id = %claims.sub, "User logged out");
        Ok(())
    }
}

/// Use case that builds the provider authorization redirect
pub struct StartOAuthLoginUseCase {
    provider: Arc<dyn OAuthProvider>,
    jwt_service: Arc<JwtService>,
}

impl StartOAuthLoginUseCase {
    pub fn new(provider: Arc<dyn OAuthProvider>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            provider,
            jwt_service,
        }
    }

    pub fn execute(&self, redirect_uri: &str) -> Result<String, AuthError> {
        let state = self.jwt_service.generate_oauth_state(redirect_uri)?;
        self.provider
            .authorize_url(&state, redirect_uri)
            .map_err(|e| AuthError::OAuthFailed {
                reason: e.to_string(),
            })
    }
}

/// Use case for the provider callback: exchange, link or create, issue a token
pub struct CompleteOAuthLoginUseCase {
    provider: Arc<dyn OAuthProvider>,
    user_repository: Arc<dyn IUserRepository>,
    password_hasher: Arc<PasswordHasher>,
    jwt_service: Arc<JwtService>,
}

impl CompleteOAuthLoginUseCase {
    pub fn new(
        provider: Arc<dyn OAuthProvider>,
        user_repository: Arc<dyn IUserRepository>,
        password_hasher: Arc<PasswordHasher>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            provider,
            user_repository,
            password_hasher,
            jwt_service,
        }
    }

    /// Returns an access token for the linked account
    pub async fn execute(&self, code: &str, state: &str) -> Result<String, AuthError> {
        let state = self.jwt_service.validate_oauth_state(state).map_err(|e| {
            tracing::warn!("OAuth state rejected: {}", e);
            AuthError::OAuthFailed {
                reason: "invalid state".to_string(),
            }
        })?;

        let info = self
            .provider
            .exchange_code(code, &state.redirect_uri)
            .await
            .map_err(|e| {
                tracing::warn!("OAuth code exchange failed: {:#}", e);
                AuthError::OAuthFailed {
                    reason: e.to_string(),
                }
            })?;

        let Some(raw_email) = info.email else {
            return Err(AuthError::OAuthMissingEmail {
                provider: self.provider.name().to_string(),
            });
        };
        let email = Email::new(raw_email).map_err(|e| AuthError::RegistrationFailed {
            errors: vec![e],
        })?;

        let mut user = match self.user_repository.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let display = info.name.unwrap_or_else(|| email.local_part().to_string());
                self.create_linked_user(&display, email).await?
            }
        };

        user.record_login();
        if let Some(at) = user.last_login_at {
            self.user_repository
                .update_last_login(&user.user_id, at)
                .await?;
        }

        self.jwt_service.generate_access_token(&user)
    }

    async fn create_linked_user(&self, display: &str, email: Email) -> Result<User, AuthError> {
        let username = self.unique_username(&sanitize_username(display)).await?;
        let password_hash = self.password_hasher.hash(generate_secure_password()).await?;

        let user = User::new(UserId::generate(), username, email, password_hash);
        self.user_repository
            .create(&user)
            .await
            .map_err(|e| match e {
                AuthError::UserAlreadyExists => AuthError::RegistrationFailed {
                    errors: vec![e.to_string()],
                },
                other => other,
            })?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            provider = self.provider.name(),
            "Created user from OAuth sign-in"
        );
        Ok(user)
    }

    async fn unique_username(&self, stem: &str) -> Result<Username, AuthError> {
        for candidate in username_candidates(stem).take(MAX_USERNAME_ATTEMPTS) {
            if self
                .user_repository
                .find_by_username(&candidate)
                .await?
                .is_none()
            {
                return Username::new(candidate).map_err(|e| AuthError::RegistrationFailed {
                    errors: vec![e],
                });
            }
        }

        Err(AuthError::RegistrationFailed {
            errors: vec![format!("No free username derived from '{}'", stem)],
        })
    }
}
