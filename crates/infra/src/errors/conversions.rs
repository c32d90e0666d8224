//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use spapi_common::auth::LwaClientError;
use spapi_domain::SpApiError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SpApiError);

impl From<InfraError> for SpApiError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SpApiError> for InfraError {
    fn from(value: SpApiError) -> Self {
        Self(value)
    }
}

trait IntoSpApiError {
    fn into_spapi(self) -> SpApiError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SpApiError */
/* -------------------------------------------------------------------------- */

impl IntoSpApiError for HttpError {
    fn into_spapi(self) -> SpApiError {
        if self.is_timeout() {
            return SpApiError::Transport("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SpApiError::Transport(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return SpApiError::Config(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            return SpApiError::upstream(
                format!("HTTP_{code}"),
                status.canonical_reason().unwrap_or("unknown status"),
                Some(code),
            );
        }

        SpApiError::Transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_spapi())
    }
}

/* -------------------------------------------------------------------------- */
/* LwaClientError → SpApiError */
/* -------------------------------------------------------------------------- */

impl IntoSpApiError for LwaClientError {
    fn into_spapi(self) -> SpApiError {
        match self {
            // Code and description pass through untouched
            Self::OAuth(error) => SpApiError::upstream(
                error.error,
                error.error_description.unwrap_or_default(),
                Some(400),
            ),
            Self::RequestFailed(err) => err.into_spapi(),
            Self::Parse(message) => SpApiError::Serialization(message),
            Self::NoRefreshToken => SpApiError::NoScopeProvided,
            Self::Config(message) => SpApiError::Config(message),
        }
    }
}

impl From<LwaClientError> for InfraError {
    fn from(value: LwaClientError) -> Self {
        Self(value.into_spapi())
    }
}
