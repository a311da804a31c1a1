//! Authentication value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User ID value object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random UserId
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UserId> for Uuid {
    fn from(user_id: UserId) -> Self {
        user_id.0
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username value object
///
/// Accepts ASCII letters, digits and `-._@+`, between 3 and 50 characters.
/// Comparison for uniqueness is case-insensitive and handled by repositories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 50;
    const ALLOWED_SYMBOLS: &'static str = "-._@+";

    pub fn new(username: String) -> Result<Self, String> {
        let username = username.trim().to_string();

        if username.is_empty() {
            return Err("Username cannot be empty".to_string());
        }

        let len = username.chars().count();
        if len < Self::MIN_LENGTH {
            return Err(format!(
                "Username must be at least {} characters",
                Self::MIN_LENGTH
            ));
        }
        if len > Self::MAX_LENGTH {
            return Err(format!(
                "Username too long (max {} characters)",
                Self::MAX_LENGTH
            ));
        }

        if let Some(bad) = username
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !Self::ALLOWED_SYMBOLS.contains(*c))
        {
            return Err(format!("Username contains invalid character '{}'", bad));
        }

        Ok(Self(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Username {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Email value object with validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub const MAX_LENGTH: usize = 256;

    /// Create a new Email, normalizing to trimmed lower case
    pub fn new(email: String) -> Result<Self, String> {
        let email = email.trim().to_lowercase();

        if email.is_empty() {
            return Err("Email cannot be empty".to_string());
        }

        let Some((local, domain)) = email.split_once('@') else {
            return Err("Invalid email format: missing @ symbol".to_string());
        };

        if domain.contains('@') {
            return Err("Invalid email format: multiple @ symbols".to_string());
        }
        if local.is_empty() {
            return Err("Invalid email format: empty local part".to_string());
        }
        if domain.is_empty() {
            return Err("Invalid email format: empty domain part".to_string());
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err("Invalid email format: domain must contain a dot".to_string());
        }
        if email.chars().any(char::is_whitespace) {
            return Err("Invalid email format: contains whitespace".to_string());
        }
        if email.len() > Self::MAX_LENGTH {
            return Err(format!(
                "Email too long (max {} characters)",
                Self::MAX_LENGTH
            ));
        }

        Ok(Email(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part before the `@`
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for Email {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Password validation result containing details about why validation failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordValidationError {
    pub message: String,
    pub missing_requirements: Vec<String>,
}

impl fmt::Display for PasswordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Plain-text password that passed the account password policy
///
/// Policy:
/// - Minimum 8 characters
/// - At least one uppercase letter
/// - At least one lowercase letter
/// - At least one digit
#[derive(Debug, Clone)]
pub struct Password(String);

impl Password {
    pub const MIN_LENGTH: usize = 8;

    pub fn new(password: String) -> Result<Self, PasswordValidationError> {
        Self::validate(&password)?;
        Ok(Password(password))
    }

    /// Check a password against the policy, collecting every unmet requirement
    pub fn validate(password: &str) -> Result<(), PasswordValidationError> {
        let mut missing = Vec::new();

        if password.chars().count() < Self::MIN_LENGTH {
            missing.push(format!("at least {} characters", Self::MIN_LENGTH));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            missing.push("at least one digit".to_string());
        }
        if !password.chars().any(|c| c.is_lowercase()) {
            missing.push("at least one lowercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_uppercase()) {
            missing.push("at least one uppercase letter".to_string());
        }

        if !missing.is_empty() {
            return Err(PasswordValidationError {
                message: format!("Password must contain: {}", missing.join(", ")),
                missing_requirements: missing,
            });
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Password hash value object (never exposes raw hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Get the hash for verification (internal use only)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// No Display or Serialize so the hash cannot leak into logs or responses
impl From<String> for PasswordHash {
    fn from(hash: String) -> Self {
        Self(hash)
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: String,
    /// Username
    pub name: String,
    pub email: String,
    /// Unique token id, the handle used for revocation
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl AccessClaims {
    pub fn user_id(&self) -> Result<UserId, super::errors::AuthError> {
        self.sub
            .parse()
            .map_err(|_| super::errors::AuthError::InvalidToken)
    }

    pub fn expires_at(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

/// Claims of the signed `state` parameter sent through the OAuth redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthStateClaims {
    pub typ: String,
    pub nonce: String,
    /// Callback URL the authorization code was issued for
    pub redirect_uri: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl OAuthStateClaims {
    pub const TYPE: &'static str = "oauth_state";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        let email = Email::new("  John.Doe@Example.COM ".to_string()).unwrap();
        assert_eq!(email.as_str(), "john.doe@example.com");
        assert_eq!(email.local_part(), "john.doe");
    }

    #[test]
    fn test_email_rejects_malformed_input() {
        assert!(Email::new(String::new()).is_err());
        assert!(Email::new("no-at-symbol".to_string()).is_err());
        assert!(Email::new("a@b@c.com".to_string()).is_err());
        assert!(Email::new("@example.com".to_string()).is_err());
        assert!(Email::new("user@localhost".to_string()).is_err());
        assert!(Email::new("user@.com".to_string()).is_err());
        assert!(Email::new("us er@example.com".to_string()).is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(Username::new("john_doe".to_string()).is_ok());
        assert!(Username::new("jane.doe+shop@floor".to_string()).is_ok());
        assert!(Username::new("ab".to_string()).is_err());
        assert!(Username::new("has space".to_string()).is_err());
        assert!(Username::new("x".repeat(51)).is_err());
    }

    #[test]
    fn test_password_collects_every_missing_requirement() {
        let err = Password::validate("abc").unwrap_err();
        assert_eq!(err.missing_requirements.len(), 3);
        assert!(err.message.contains("at least 8 characters"));
        assert!(err.message.contains("at least one digit"));
        assert!(err.message.contains("at least one uppercase letter"));
    }

    #[test]
    fn test_password_without_special_character_is_accepted() {
        assert!(Password::new("Password123".to_string()).is_ok());
    }

    #[test]
    fn test_user_id_parses_from_string() {
        let id = UserId::generate();
        let parsed: UserId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }
}
