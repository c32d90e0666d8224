//! Error types used throughout the client
//!
//! Every failure surfaces as an [`SpApiError`] carrying a stable
//! machine-readable [`code`](SpApiError::code) and a human-readable
//! [`message`](SpApiError::message). Local validation and resolution errors
//! use fixed upper-snake-case codes; errors returned by the authorization
//! server or the API keep the upstream code and message untouched.

use std::time::Duration;

use spapi_common::error::{ErrorClassification, ErrorSeverity};
use thiserror::Error;

use crate::constants::{UPSTREAM_INVALID_GRANT, UPSTREAM_INVALID_REQUEST, UPSTREAM_UNAUTHORIZED};

/// Main error type for the Selling Partner API client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpApiError {
    #[error("Please provide a refresh_token or set only_grantless_operations")]
    NoRefreshTokenProvided,

    #[error(
        "Please provide one of: na, eu or fe as region (got {})",
        .region.as_deref().unwrap_or("nothing")
    )]
    NoValidRegionProvided { region: Option<String> },

    #[error("Please provide an operation to call")]
    NoOperationGiven,

    #[error("Operation {operation} is not grantless and only_grantless_operations is enabled")]
    InvalidOperationError { operation: String },

    #[error("No endpoint found: {endpoint}")]
    EndpointNotFound { endpoint: String },

    #[error("The operation {operation} is not valid for endpoint {endpoint}")]
    InvalidOperationForEndpoint { operation: String, endpoint: String },

    #[error("Please provide a refresh_token or a grantless scope to request an access token")]
    NoScopeProvided,

    #[error("No access token and/or role credentials present and auto_request_tokens is disabled")]
    NoAccessTokenAndOrRoleCredentialsPresent,

    #[error("Operation not found: {operation}")]
    OperationNotFound { operation: String },

    #[error("The parameters given for {operation} do not match any documented sandbox request")]
    InvalidSandboxParameters { operation: String },

    #[error(
        "Please provide a valid HTTP method for api_path calls (got {})",
        .method.as_deref().unwrap_or("nothing")
    )]
    NoValidMethodProvided { method: Option<String> },

    #[error("Versions defined for unknown endpoints: {}", .endpoints.join(", "))]
    VersionDefinedForInvalidEndpoints { endpoints: Vec<String> },

    #[error("Invalid versions defined for endpoints: {}", .endpoints.join(", "))]
    InvalidVersionForEndpoints { endpoints: Vec<String> },

    #[error("Invalid version {version} for endpoint {endpoint}")]
    InvalidVersion { endpoint: String, version: String },

    #[error("Operation {operation} not found in version {version} of endpoint {endpoint}")]
    OperationNotFoundForVersion { operation: String, endpoint: String, version: String },

    #[error("Missing path parameter {parameter} for operation {operation}")]
    MissingPathParameter { parameter: String, operation: String },

    #[error("Credentials missing: {0}")]
    CredentialsMissing(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A credential refresh panicked instead of returning
    #[error("Internal error: {0}")]
    Internal(String),

    /// Error returned by the authorization server or the API, code and
    /// message as received
    #[error("{code}: {message}")]
    Upstream { code: String, message: String, status: Option<u16> },
}

impl SpApiError {
    /// Build an upstream error from the status and payload fields
    #[must_use]
    pub fn upstream(
        code: impl Into<String>,
        message: impl Into<String>,
        status: Option<u16>,
    ) -> Self {
        Self::Upstream { code: code.into(), message: message.into(), status }
    }

    /// Stable error code
    ///
    /// Upstream errors return the upstream code verbatim (`invalid_grant`,
    /// `Unauthorized`, `QuotaExceeded`, ...).
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::NoRefreshTokenProvided => "NO_REFRESH_TOKEN_PROVIDED",
            Self::NoValidRegionProvided { .. } => "NO_VALID_REGION_PROVIDED",
            Self::NoOperationGiven => "NO_OPERATION_GIVEN",
            Self::InvalidOperationError { .. } => "INVALID_OPERATION_ERROR",
            Self::EndpointNotFound { .. } => "ENDPOINT_NOT_FOUND",
            Self::InvalidOperationForEndpoint { .. } => "INVALID_OPERATION_FOR_ENDPOINT",
            Self::NoScopeProvided => "NO_SCOPE_PROVIDED",
            Self::NoAccessTokenAndOrRoleCredentialsPresent => {
                "NO_ACCESS_TOKEN_AND_OR_ROLE_CREDENTIALS_PRESENT"
            }
            Self::OperationNotFound { .. } => "OPERATION_NOT_FOUND",
            Self::InvalidSandboxParameters { .. } => "INVALID_SANDBOX_PARAMETERS",
            Self::NoValidMethodProvided { .. } => "NO_VALID_METHOD_PROVIDED",
            Self::VersionDefinedForInvalidEndpoints { .. } => {
                "VERSION_DEFINED_FOR_INVALID_ENDPOINTS"
            }
            Self::InvalidVersionForEndpoints { .. } => "INVALID_VERSION_FOR_ENDPOINTS",
            Self::InvalidVersion { .. } => "INVALID_VERSION",
            Self::OperationNotFoundForVersion { .. } => "OPERATION_NOT_FOUND_FOR_VERSION",
            Self::MissingPathParameter { .. } => "MISSING_PATH_PARAMETER",
            Self::CredentialsMissing(_) => "CREDENTIALS_MISSING",
            Self::InvalidCatalog(_) => "INVALID_CATALOG",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Upstream { code, .. } => code.as_str(),
        }
    }

    /// Human-readable message
    ///
    /// Upstream errors return the upstream message verbatim, e.g.
    /// `"The request has an invalid parameter : code"`.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of an upstream error, if one was received
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// The authorization server rejected an authorization code
    #[must_use]
    pub fn is_invalid_code_parameter(&self) -> bool {
        matches!(self, Self::Upstream { code, .. } if code == UPSTREAM_INVALID_REQUEST)
    }

    /// The authorization server rejected the stored refresh token
    #[must_use]
    pub fn is_invalid_refresh_token(&self) -> bool {
        matches!(self, Self::Upstream { code, .. } if code == UPSTREAM_INVALID_GRANT)
    }

    /// The API rejected the access token attached to a call
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Upstream { code, status: Some(401 | 403), .. } if code == UPSTREAM_UNAUTHORIZED
        )
    }

    /// True for errors detected locally, before any network exchange
    #[must_use]
    pub const fn is_local(&self) -> bool {
        !matches!(self, Self::Upstream { .. } | Self::Transport(_))
    }
}

impl ErrorClassification for SpApiError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Upstream { status: Some(status), .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidCatalog(_) | Self::Internal(_) => ErrorSeverity::Critical,
            Self::NoRefreshTokenProvided
            | Self::NoValidRegionProvided { .. }
            | Self::VersionDefinedForInvalidEndpoints { .. }
            | Self::InvalidVersionForEndpoints { .. }
            | Self::CredentialsMissing(_)
            | Self::Config(_)
            | Self::Serialization(_) => ErrorSeverity::Error,
            Self::Upstream { .. } if self.is_invalid_refresh_token() => ErrorSeverity::Error,
            Self::Upstream { .. } | Self::Transport(_) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Info,
        }
    }

    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Upstream { status: Some(429), .. } => Some(Duration::from_secs(1)),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SpApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, SpApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(SpApiError::NoOperationGiven.code(), "NO_OPERATION_GIVEN");
        assert_eq!(
            SpApiError::NoAccessTokenAndOrRoleCredentialsPresent.code(),
            "NO_ACCESS_TOKEN_AND_OR_ROLE_CREDENTIALS_PRESENT"
        );
        assert_eq!(
            SpApiError::OperationNotFoundForVersion {
                operation: "listCatalogCategories".into(),
                endpoint: "catalogItems".into(),
                version: "2020-12-01".into(),
            }
            .code(),
            "OPERATION_NOT_FOUND_FOR_VERSION"
        );
        assert_eq!(SpApiError::Config("x".into()).code(), "CONFIG_ERROR");
    }

    #[test]
    fn upstream_code_and_message_pass_through() {
        let err = SpApiError::upstream(
            "invalid_request",
            "The request has an invalid parameter : code",
            Some(400),
        );

        assert_eq!(err.code(), "invalid_request");
        assert_eq!(err.message(), "The request has an invalid parameter : code");
        assert_eq!(err.status(), Some(400));
        assert!(err.is_invalid_code_parameter());
        assert!(!err.is_invalid_refresh_token());
        assert!(!err.is_local());
    }

    #[test]
    fn invalid_grant_is_invalid_refresh_token() {
        let err = SpApiError::upstream(
            "invalid_grant",
            "The request has an invalid grant parameter : refresh_token",
            Some(400),
        );
        assert!(err.is_invalid_refresh_token());
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn unauthorized_requires_auth_status() {
        assert!(SpApiError::upstream(
            "Unauthorized",
            "Access to requested resource is denied.",
            Some(403)
        )
        .is_unauthorized());
        assert!(!SpApiError::upstream("Unauthorized", "denied", Some(400)).is_unauthorized());
        assert!(!SpApiError::upstream("InvalidInput", "bad", Some(403)).is_unauthorized());
    }

    #[test]
    fn local_message_is_display_text() {
        let err = SpApiError::VersionDefinedForInvalidEndpoints {
            endpoints: vec!["invalidEndpoint".into(), "other".into()],
        };
        assert_eq!(err.message(), "Versions defined for unknown endpoints: invalidEndpoint, other");
        assert!(err.is_local());
    }

    #[test]
    fn classification() {
        assert!(SpApiError::Transport("timeout".into()).is_retryable());
        assert!(SpApiError::upstream("QuotaExceeded", "slow down", Some(429)).is_retryable());
        assert_eq!(
            SpApiError::upstream("QuotaExceeded", "slow down", Some(429)).retry_after(),
            Some(Duration::from_secs(1))
        );
        assert!(!SpApiError::NoOperationGiven.is_retryable());
        assert_eq!(SpApiError::NoOperationGiven.severity(), ErrorSeverity::Info);
        assert!(SpApiError::InvalidCatalog("no versions".into()).is_critical());
    }
}
