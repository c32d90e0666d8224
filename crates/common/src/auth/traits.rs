//! Traits for LWA operations
//!
//! These traits enable dependency injection and testing by abstracting the
//! authorization server.

use async_trait::async_trait;

use super::client::LwaClientError;
use super::types::TokenSet;

/// Trait for Login with Amazon client operations
#[async_trait]
pub trait LwaClientTrait: Send + Sync {
    /// Exchange an authorization code for a refresh token and access token
    ///
    /// # Errors
    /// Returns the upstream [`super::OAuthError`] unchanged when LWA rejects
    /// the code, or a transport/parse error.
    async fn exchange_code_for_tokens(&self, code: &str) -> Result<TokenSet, LwaClientError>;

    /// Refresh access token using a refresh token
    ///
    /// # Errors
    /// Returns error if the refresh token is empty, invalid or revoked
    async fn refresh_access_token(&self, refresh_token: &str)
        -> Result<TokenSet, LwaClientError>;

    /// Obtain a grantless access token for `scope`
    ///
    /// # Errors
    /// Returns error if the application credentials are rejected
    async fn client_credentials_token(&self, scope: &str) -> Result<TokenSet, LwaClientError>;
}
