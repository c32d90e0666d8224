//! Request dispatch
//!
//! Builds the outbound request for a resolved call, sends it through the
//! [`Transport`] port and normalizes the response.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use spapi_domain::constants::{
    DEFAULT_USER_AGENT, HEADER_ACCESS_TOKEN, HEADER_AMZ_DATE, HEADER_CONTENT_TYPE, HEADER_HOST,
    HEADER_USER_AGENT, JSON_CONTENT_TYPE,
};
use spapi_domain::{
    param_to_string, CallResponse, HttpRequest, HttpResponse, QueryParams, Region, ResolvedCall,
    Result, SpApiError,
};
use tracing::{debug, warn};

use crate::credentials::Authorization;
use crate::ports::{RequestSigner, Transport};

/// Turns resolved calls into HTTP exchanges
pub struct RequestDispatcher {
    region: Region,
    transport: Arc<dyn Transport>,
    signer: Option<Arc<dyn RequestSigner>>,
    user_agent: String,
    base_url: Option<String>,
}

impl RequestDispatcher {
    #[must_use]
    pub fn new(region: Region, transport: Arc<dyn Transport>) -> Self {
        Self {
            region,
            transport,
            signer: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: None,
        }
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Send every call to `base_url` instead of the regional host
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Build the unsigned request for `resolved`
    ///
    /// # Errors
    /// Returns `SERIALIZATION_ERROR` if `body` cannot be encoded
    pub fn build_request(
        &self,
        resolved: &ResolvedCall,
        authorization: &Authorization,
        body: Option<&Value>,
    ) -> Result<HttpRequest> {
        let (origin, host) = match &self.base_url {
            Some(base) => (base.clone(), host_of(base).to_string()),
            None => {
                let host = self.region.host_for(resolved.sandbox);
                (format!("https://{host}"), host)
            }
        };

        let mut url = format!("{origin}{}", resolved.path);
        let query = query_string(&resolved.query);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        let mut request = HttpRequest::new(resolved.method, url)
            .header(HEADER_ACCESS_TOKEN, authorization.access_token.token.clone())
            .header(HEADER_HOST, host)
            .header(HEADER_AMZ_DATE, Utc::now().format("%Y%m%dT%H%M%SZ").to_string())
            .header(HEADER_USER_AGENT, self.user_agent.clone())
            .header(HEADER_CONTENT_TYPE, JSON_CONTENT_TYPE);

        if let Some(body) = body {
            request = request.body(serde_json::to_string(body)?);
        }
        Ok(request)
    }

    /// Build, sign and send the request for `resolved`
    ///
    /// # Errors
    /// Transport and signing errors, or `Upstream` for any non-2xx response
    pub async fn dispatch(
        &self,
        resolved: &ResolvedCall,
        authorization: &Authorization,
        body: Option<&Value>,
        raw_result: bool,
    ) -> Result<CallResponse> {
        let mut request = self.build_request(resolved, authorization, body)?;

        if let Some(credentials) = &authorization.role_credentials {
            let signer = self.signer.as_ref().ok_or_else(|| {
                SpApiError::Config(
                    "sign_requests is enabled but no request signer is configured".into(),
                )
            })?;
            request = signer.sign(request, credentials, self.region.aws_region()).await?;
        }

        debug!(
            call = %resolved.label(),
            method = %request.method,
            url = %request.url,
            "dispatching"
        );
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let error = upstream_error(&response);
            warn!(
                call = %resolved.label(),
                status = response.status,
                code = error.code(),
                "call rejected"
            );
            return Err(error);
        }

        debug!(call = %resolved.label(), status = response.status, "call succeeded");
        Ok(CallResponse {
            status: response.status,
            body: response_body(&response.body, raw_result),
            headers: response.headers,
        })
    }
}

fn host_of(base_url: &str) -> &str {
    let rest = base_url
        .strip_prefix("https://")
        .or_else(|| base_url.strip_prefix("http://"))
        .unwrap_or(base_url);
    rest.split('/').next().unwrap_or(rest)
}

/// Sorted, percent-encoded query string; arrays are comma-joined
fn query_string(query: &QueryParams) -> String {
    query
        .iter()
        .map(|(name, value)| {
            let value = param_to_string(value);
            format!("{}={}", urlencoding::encode(name), urlencoding::encode(&value))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn response_body(body: &str, raw_result: bool) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut map)) if !raw_result && map.contains_key("payload") => {
            map.remove("payload").unwrap_or(Value::Null)
        }
        Ok(value) => value,
        Err(_) => Value::String(body.to_string()),
    }
}

#[derive(Deserialize)]
struct ApiErrors {
    errors: Vec<ApiErrorItem>,
}

#[derive(Deserialize)]
struct ApiErrorItem {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn upstream_error(response: &HttpResponse) -> SpApiError {
    let status = Some(response.status);

    if let Ok(parsed) = serde_json::from_str::<ApiErrors>(&response.body) {
        if let Some(first) = parsed.errors.into_iter().next() {
            return SpApiError::upstream(first.code, first.message, status);
        }
    }
    if let Ok(oauth) = serde_json::from_str::<OAuthErrorBody>(&response.body) {
        let description = oauth.error_description.unwrap_or_default();
        return SpApiError::upstream(oauth.error, description, status);
    }
    SpApiError::upstream(format!("HTTP_{}", response.status), response.body.clone(), status)
}
