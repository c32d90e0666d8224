//! LWA token types and configuration
//!
//! Defines the data structures exchanged with the Login with Amazon token
//! endpoint.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Production LWA token endpoint.
pub const DEFAULT_LWA_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";

/// Upper bound applied to `expires_in` when computing `expires_at` (one year)
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// LWA access token with optional refresh token and expiry metadata
///
/// - Optional refresh token (only the authorization_code and refresh_token
///   grants return one)
/// - Both `expires_in` (duration) and `expires_at` (timestamp)
/// - Scope tracking for grantless tokens
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access token sent as `x-amz-access-token`
    pub access_token: String,

    /// Refresh token for obtaining new access tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (LWA returns "bearer")
    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    /// Absolute expiration timestamp (UTC), calculated from `expires_in`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scope (grantless tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Create a new `TokenSet` with calculated expiration time
    ///
    /// `expires_at` is derived from `expires_in`, capped at
    /// [`MAX_TOKEN_LIFETIME_SECS`]; a non-positive lifetime leaves it unset.
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        expires_in: i64,
        scope: Option<String>,
    ) -> Self {
        let expires_at = if expires_in > 0 {
            chrono::Duration::try_seconds(expires_in.min(MAX_TOKEN_LIFETIME_SECS))
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        } else {
            None
        };

        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at,
            scope,
        }
    }
}

impl fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Token response from the LWA token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: i64,
    pub scope: Option<String>,
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            response.scope,
        );
        if let Some(token_type) = response.token_type {
            tokens.token_type = token_type;
        }
        tokens
    }
}

/// Application credentials registered with LWA
#[derive(Clone)]
pub struct LwaConfig {
    /// LWA client identifier of the SP-API application
    pub client_id: String,

    /// LWA client secret of the SP-API application
    pub client_secret: String,

    /// Token endpoint (overridable for tests and regional proxies)
    pub token_url: String,

    /// Redirect URI registered for the authorization code flow, if any
    pub redirect_uri: Option<String>,
}

impl LwaConfig {
    /// Create a configuration targeting the production token endpoint
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            token_url: DEFAULT_LWA_TOKEN_URL.to_string(),
            redirect_uri: None,
        }
    }

    /// Point the client at a different token endpoint
    #[must_use]
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Set the redirect URI sent with authorization code exchanges
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }
}

impl fmt::Debug for LwaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LwaConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

/// OAuth error response from the authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2). LWA fills
/// `error_description` with the human-readable message, e.g.
/// `"The request has an invalid parameter : code"`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
