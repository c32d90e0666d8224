//! AWS STS `AssumeRole` role credentials provider

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use spapi_core::{RoleCredentialsProvider, Transport};
use spapi_domain::constants::{
    HEADER_CONTENT_TYPE, ROLE_SESSION_NAME, STS_API_VERSION, STS_ENDPOINT, STS_REGION, STS_SERVICE,
};
use spapi_domain::{HttpMethod, HttpRequest, Result, RoleCredentials, SpApiError};
use tracing::{debug, instrument};

use crate::signing::sign_request;

/// Assumes the application's IAM role with its long-term AWS keys
pub struct StsRoleProvider {
    transport: Arc<dyn Transport>,
    endpoint: String,
    keys: RoleCredentials,
    role_arn: String,
    session_name: String,
}

impl StsRoleProvider {
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        role_arn: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            endpoint: STS_ENDPOINT.to_string(),
            keys: RoleCredentials {
                access_key_id: access_key_id.into(),
                secret_access_key: secret_access_key.into(),
                session_token: None,
                expires_at: None,
            },
            role_arn: role_arn.into(),
            session_name: ROLE_SESSION_NAME.to_string(),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = session_name.into();
        self
    }

    fn request(&self) -> Result<HttpRequest> {
        let body = [
            ("Action", "AssumeRole"),
            ("RoleArn", self.role_arn.as_str()),
            ("RoleSessionName", self.session_name.as_str()),
            ("Version", STS_API_VERSION),
        ]
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

        let url = format!("{}/", self.endpoint.trim_end_matches('/'));
        let request = HttpRequest::new(HttpMethod::Post, url)
            .header(HEADER_CONTENT_TYPE, "application/x-www-form-urlencoded; charset=utf-8")
            .header("accept", "application/json")
            .body(body);
        sign_request(request, &self.keys, STS_REGION, STS_SERVICE, Utc::now())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleEnvelope {
    assume_role_response: AssumeRoleResponse,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    assume_role_result: AssumeRoleResult,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResult {
    credentials: StsCredentials,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    expiration: Expiration,
}

/// STS reports expiry as epoch seconds in JSON, ISO 8601 elsewhere
#[derive(Deserialize)]
#[serde(untagged)]
enum Expiration {
    Epoch(f64),
    Timestamp(DateTime<Utc>),
}

impl Expiration {
    fn into_datetime(self) -> Option<DateTime<Utc>> {
        match self {
            #[allow(clippy::cast_possible_truncation)]
            Self::Epoch(secs) => Utc.timestamp_opt(secs as i64, 0).single(),
            Self::Timestamp(at) => Some(at),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsErrorEnvelope {
    error: StsError,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StsError {
    code: String,
    #[serde(default)]
    message: String,
}

#[async_trait]
impl RoleCredentialsProvider for StsRoleProvider {
    #[instrument(skip(self), fields(role_arn = %self.role_arn))]
    async fn assume_role(&self) -> Result<RoleCredentials> {
        let response = self.transport.send(self.request()?).await?;

        if !response.is_success() {
            return Err(match serde_json::from_str::<StsErrorEnvelope>(&response.body) {
                Ok(envelope) => SpApiError::upstream(
                    envelope.error.code,
                    envelope.error.message,
                    Some(response.status),
                ),
                Err(_) => SpApiError::upstream(
                    format!("HTTP_{}", response.status),
                    response.body,
                    Some(response.status),
                ),
            });
        }

        let envelope: AssumeRoleEnvelope = serde_json::from_str(&response.body)?;
        let credentials = envelope.assume_role_response.assume_role_result.credentials;
        debug!(access_key_id = %credentials.access_key_id, "role assumed");

        Ok(RoleCredentials {
            access_key_id: credentials.access_key_id,
            secret_access_key: credentials.secret_access_key,
            session_token: Some(credentials.session_token),
            expires_at: credentials.expiration.into_datetime(),
        })
    }
}
