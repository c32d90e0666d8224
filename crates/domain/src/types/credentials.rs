//! Credential value types
//!
//! These are the values the credential manager caches and hands out. All
//! `Debug` impls redact secrets.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::operation::GrantlessScope;
use crate::constants::MAX_TOKEN_LIFETIME_SECS;

/// Cache slot a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenScope {
    /// Seller-delegated token obtained with the refresh token
    Delegated,
    /// Client-credentials token for one grantless scope
    Grantless(GrantlessScope),
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delegated => f.write_str("delegated"),
            Self::Grantless(scope) => f.write_str(scope.as_str()),
        }
    }
}

/// LWA access token with its expiry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    /// `None` for caller-supplied tokens of unknown lifetime
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token: token.into(), expires_at }
    }

    /// Token valid for `expires_in` seconds from now, at most
    /// [`MAX_TOKEN_LIFETIME_SECS`]
    #[must_use]
    pub fn expiring_in(token: impl Into<String>, expires_in: i64) -> Self {
        let expires_at = if expires_in > 0 {
            after_now(expires_in.min(MAX_TOKEN_LIFETIME_SECS))
        } else {
            None
        };
        Self::new(token, expires_at)
    }

    /// Usable unless it expires within `margin_secs`
    #[must_use]
    pub fn is_usable(&self, margin_secs: i64) -> bool {
        self.expires_at.map_or(true, |at| usable_until(at, margin_secs))
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[redacted]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Temporary AWS credentials used to sign requests
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RoleCredentials {
    /// Usable unless they expire within `margin_secs`
    #[must_use]
    pub fn is_usable(&self, margin_secs: i64) -> bool {
        self.expires_at.map_or(true, |at| usable_until(at, margin_secs))
    }
}

fn after_now(secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
}

// An unrepresentable margin means the deadline has effectively passed.
fn usable_until(expires_at: DateTime<Utc>, margin_secs: i64) -> bool {
    after_now(margin_secs).map_or(false, |deadline| deadline < expires_at)
}

impl fmt::Debug for RoleCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoleCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[redacted]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Grant posted to the authorization server
#[derive(Clone, PartialEq, Eq)]
pub enum TokenGrant {
    AuthorizationCode { code: String },
    RefreshToken { refresh_token: String },
    ClientCredentials { scope: GrantlessScope },
}

impl TokenGrant {
    /// OAuth2 `grant_type` value
    #[must_use]
    pub const fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
            Self::ClientCredentials { .. } => "client_credentials",
        }
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientCredentials { scope } => {
                f.debug_struct("ClientCredentials").field("scope", scope).finish()
            }
            other => f.debug_struct(other.grant_type()).finish_non_exhaustive(),
        }
    }
}

/// Tokens returned by a successful grant
#[derive(Clone, PartialEq, Eq)]
pub struct GrantedTokens {
    pub access_token: AccessToken,
    /// Present for authorization-code exchanges (and some refreshes)
    pub refresh_token: Option<String>,
}

impl fmt::Debug for GrantedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrantedTokens")
            .field("access_token", &self.access_token)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}
