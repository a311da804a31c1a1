//! JWT service for token generation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::domain::auth::{
    entities::User,
    errors::AuthError,
    value_objects::{AccessClaims, OAuthStateClaims},
};

/// Lifetime of the OAuth `state` round-trip
const STATE_TTL_MINUTES: i64 = 10;

/// HS256 token issuer and validator
#[derive(Clone)]
pub struct JwtService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    issuer: String,
    audience: String,
    expiration: Duration,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: Arc::new(EncodingKey::from_secret(config.key.as_bytes())),
            decoding_key: Arc::new(DecodingKey::from_secret(config.key.as_bytes())),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            expiration: Duration::minutes(config.expiration_minutes),
        }
    }

    /// Access token lifetime
    pub fn expiration(&self) -> Duration {
        self.expiration
    }

    /// Issue an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user.user_id.as_str(),
            name: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + self.expiration).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        self.sign(&claims)
    }

    /// Validate signature, issuer, audience and lifetime with no clock skew
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.verify::<AccessClaims>(token)
    }

    /// Issue the signed `state` value for an OAuth authorization request
    pub fn generate_oauth_state(&self, redirect_uri: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = OAuthStateClaims {
            typ: OAuthStateClaims::TYPE.to_string(),
            nonce: Uuid::new_v4().to_string(),
            redirect_uri: redirect_uri.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(STATE_TTL_MINUTES)).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        self.sign(&claims)
    }

    pub fn validate_oauth_state(&self, state: &str) -> Result<OAuthStateClaims, AuthError> {
        let claims = self.verify::<OAuthStateClaims>(state)?;
        if claims.typ != OAuthStateClaims::TYPE {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT token: {}", e);
            AuthError::TokenIssuing {
                message: e.to_string(),
            }
        })
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {}", e);
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })
    }
}
