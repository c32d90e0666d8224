//! Login with Amazon HTTP client
//!
//! Handles the token grants used by the Selling Partner API:
//! - Authorization code exchange
//! - Token refresh
//! - Client credentials (grantless) tokens

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use super::traits::LwaClientTrait;
use super::types::{LwaConfig, OAuthError, TokenResponse, TokenSet};

/// Error type for LWA client operations
#[derive(Debug, Error)]
pub enum LwaClientError {
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// LWA returned an OAuth error payload
    #[error("OAuth error: {0}")]
    OAuth(OAuthError),

    /// Response body could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// No refresh token available
    #[error("No refresh token available")]
    NoRefreshToken,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// LWA token client
///
/// Posts form-encoded grants to the configured token URL, authenticating
/// with the application's client id and secret in the body.
#[derive(Debug, Clone)]
pub struct LwaClient {
    config: LwaConfig,
    client: Client,
}

impl LwaClient {
    /// Create a new LWA client with a 30 second request timeout
    ///
    /// # Errors
    /// Returns [`LwaClientError::Config`] if the HTTP client cannot be built
    pub fn new(config: LwaConfig) -> Result<Self, LwaClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LwaClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Create a client that reuses an existing reqwest client
    #[must_use]
    pub fn with_http_client(config: LwaConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Exchange authorization code for tokens
    ///
    /// # Errors
    /// Returns [`LwaClientError::OAuth`] with LWA's `error` and
    /// `error_description` untouched when the code is rejected.
    pub async fn exchange_code_for_tokens(&self, code: &str) -> Result<TokenSet, LwaClientError> {
        let mut params = vec![
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
        ];

        if let Some(redirect_uri) = &self.config.redirect_uri {
            params.push(("redirect_uri", redirect_uri.clone()));
        }

        self.post_grant(params).await
    }

    /// Refresh access token using refresh token
    ///
    /// # Errors
    /// Returns error if:
    /// - No refresh token provided
    /// - Refresh fails
    /// - Token is invalid/revoked (`invalid_grant`)
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, LwaClientError> {
        if refresh_token.is_empty() {
            return Err(LwaClientError::NoRefreshToken);
        }

        let params = vec![
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token.to_string()),
        ];

        self.post_grant(params).await
    }

    /// Obtain a grantless token for `scope`
    ///
    /// # Errors
    /// Returns error if the scope is empty or LWA rejects the grant
    pub async fn client_credentials_token(&self, scope: &str) -> Result<TokenSet, LwaClientError> {
        if scope.is_empty() {
            return Err(LwaClientError::Config("grantless scope must not be empty".to_string()));
        }

        let params =
            vec![("grant_type", "client_credentials".to_string()), ("scope", scope.to_string())];

        self.post_grant(params).await
    }

    /// Get a reference to the LWA configuration
    #[must_use]
    pub fn config(&self) -> &LwaConfig {
        &self.config
    }

    async fn post_grant(
        &self,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<TokenSet, LwaClientError> {
        params.push(("client_id", self.config.client_id.clone()));
        params.push(("client_secret", self.config.client_secret.clone()));

        let grant_type = params.first().map(|(_, v)| v.clone()).unwrap_or_default();
        debug!(grant_type = %grant_type, url = %self.config.token_url, "requesting LWA token");

        let response = self.client.post(&self.config.token_url).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            let error: OAuthError = serde_json::from_str(&body).map_err(|e| {
                LwaClientError::Parse(format!("status {status} with unexpected body ({e}): {body}"))
            })?;
            debug!(grant_type = %grant_type, %status, error = %error.error, "LWA rejected grant");
            return Err(LwaClientError::OAuth(error));
        }

        let token_response: TokenResponse =
            response.json().await.map_err(|e| LwaClientError::Parse(e.to_string()))?;

        Ok(token_response.into())
    }
}

#[async_trait]
impl LwaClientTrait for LwaClient {
    async fn exchange_code_for_tokens(&self, code: &str) -> Result<TokenSet, LwaClientError> {
        self.exchange_code_for_tokens(code).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, LwaClientError> {
        self.refresh_access_token(refresh_token).await
    }

    async fn client_credentials_token(&self, scope: &str) -> Result<TokenSet, LwaClientError> {
        self.client_credentials_token(scope).await
    }
}
