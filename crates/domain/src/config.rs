//! Client configuration structures
//!
//! [`ClientConfig`] is deserializable from JSON or TOML and is validated once
//! when a client is constructed. Region stays a string here so that an
//! unsupported value is reported as `NO_VALID_REGION_PROVIDED` by the
//! validator instead of failing deserialization.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::RoleCredentials;

/// Construction-time configuration of a Selling Partner API client
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `na`, `eu` or `fe` (case-insensitive)
    pub region: Option<String>,
    pub refresh_token: Option<String>,
    /// Caller-supplied access token of unknown lifetime
    pub access_token: Option<String>,
    pub role_credentials: Option<RoleCredentials>,
    pub credentials: AppCredentials,
    /// Endpoint name to version used when a call names no version
    pub endpoints_versions: BTreeMap<String, String>,
    pub options: ClientOptions,
}

impl ClientConfig {
    /// Configuration for `region` authorized by a seller refresh token
    #[must_use]
    pub fn new(region: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            refresh_token: Some(refresh_token.into()),
            ..Self::default()
        }
    }

    /// Configuration for `region` restricted to grantless operations
    #[must_use]
    pub fn grantless(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            options: ClientOptions { only_grantless_operations: true, ..ClientOptions::default() },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: AppCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_endpoint_version(
        mut self,
        endpoint: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        self.endpoints_versions.insert(endpoint.into(), version.into());
        self
    }

    #[must_use]
    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    #[must_use]
    pub fn with_role_credentials(mut self, role_credentials: RoleCredentials) -> Self {
        self.role_credentials = Some(role_credentials);
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("region", &self.region)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .field("role_credentials", &self.role_credentials)
            .field("credentials", &self.credentials)
            .field("endpoints_versions", &self.endpoints_versions)
            .field("options", &self.options)
            .finish()
    }
}

/// Application credentials
///
/// The LWA client id/secret are needed for every token grant. The AWS keys
/// and role ARN are only needed when requests are signed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    /// ARN of the IAM role registered for the application
    pub role_arn: Option<String>,
}

impl AppCredentials {
    #[must_use]
    pub fn lwa(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_aws(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        role_arn: impl Into<String>,
    ) -> Self {
        self.aws_access_key_id = Some(access_key_id.into());
        self.aws_secret_access_key = Some(secret_access_key.into());
        self.role_arn = Some(role_arn.into());
        self
    }

    /// Whether the LWA client id and secret are both present
    #[must_use]
    pub const fn has_lwa(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Whether everything needed to assume the signing role is present
    #[must_use]
    pub const fn has_aws(&self) -> bool {
        self.aws_access_key_id.is_some()
            && self.aws_secret_access_key.is_some()
            && self.role_arn.is_some()
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[redacted]"))
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field(
                "aws_secret_access_key",
                &self.aws_secret_access_key.as_ref().map(|_| "[redacted]"),
            )
            .field("role_arn", &self.role_arn)
            .finish()
    }
}

/// Behavioral options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Only grantless operations may be called; no refresh token needed
    pub only_grantless_operations: bool,
    /// Request and renew tokens automatically
    pub auto_request_tokens: bool,
    /// Send every call to the sandbox host
    pub use_sandbox: bool,
    /// Search other versions of an endpoint for a missing operation
    pub version_fallback: bool,
    /// Sign requests with role credentials (AWS SigV4)
    pub sign_requests: bool,
    pub user_agent: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            only_grantless_operations: false,
            auto_request_tokens: true,
            use_sandbox: false,
            version_fallback: true,
            sign_requests: false,
            user_agent: None,
            timeout_ms: None,
        }
    }
}
