//! Google OAuth 2.0 authorization-code client

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::GoogleOAuthConfig;

/// Identity returned by an OAuth provider after a successful exchange
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OAuthUserInfo {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// External identity provider used for sign-in
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Display name used in error messages
    fn name(&self) -> &'static str;

    /// URL the browser is redirected to in order to start sign-in
    fn authorize_url(&self, state: &str, redirect_uri: &str) -> anyhow::Result<String>;

    /// Trade an authorization code for the signed-in user's identity
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
    -> anyhow::Result<OAuthUserInfo>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: Option<String>,
    name: Option<String>,
    given_name: Option<String>,
}

/// Google sign-in over plain HTTPS calls
pub struct GoogleOAuthProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuthProvider {
    pub const SCOPE: &'static str = "openid email profile";

    pub fn new(config: &GoogleOAuthConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("prodsched/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build OAuth HTTP client")?;

        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
            userinfo_url: config.userinfo_url.clone(),
        })
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthProvider {
    fn name(&self) -> &'static str {
        "Google"
    }

    fn authorize_url(&self, state: &str, redirect_uri: &str) -> anyhow::Result<String> {
        let url = Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", Self::SCOPE),
                ("state", state),
            ],
        )
        .with_context(|| format!("Invalid authorization URL: {}", self.auth_url))?;

        Ok(url.into())
    }

    #[tracing::instrument(skip(self, code))]
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> anyhow::Result<OAuthUserInfo> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("Token request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Google token endpoint rejected the code");
            return Err(anyhow!("Token endpoint returned {}: {}", status, body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Malformed token response")?;

        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("User info request failed")?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "Google user info request failed");
            return Err(anyhow!("User info endpoint returned {}", status));
        }

        let info: UserInfoResponse = response
            .json()
            .await
            .context("Malformed user info response")?;

        Ok(OAuthUserInfo {
            email: info.email.filter(|e| !e.trim().is_empty()),
            name: info.name.or(info.given_name).filter(|n| !n.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_carries_all_parameters() {
        let provider = GoogleOAuthProvider::new(&GoogleOAuthConfig {
            client_id: "client-123".to_string(),
            client_secret: "shh".to_string(),
            ..Default::default()
        })
        .unwrap();

        let url = provider
            .authorize_url("signed-state", "http://localhost:5000/api/auth/oauth-success")
            .unwrap();
        let parsed = Url::parse(&url).unwrap();
        let params: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(parsed.host_str(), Some("accounts.google.com"));
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "openid email profile");
        assert_eq!(params["state"], "signed-state");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:5000/api/auth/oauth-success"
        );
        assert!(!params.contains_key("client_secret"));
    }
}
