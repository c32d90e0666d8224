//! Mock port implementations
//!
//! Each mock records what it was asked to do so tests can assert on call
//! counts and request contents.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use spapi_core::{AuthorizationServer, RequestSigner, RoleCredentialsProvider, Transport};
use spapi_domain::{
    AccessToken, GrantedTokens, HttpRequest, HttpResponse, Result, RoleCredentials, SpApiError,
    TokenGrant,
};

/// Authorization code the mock server rejects
pub const INVALID_AUTH_CODE: &str = "invalid_auth_code";
/// Refresh token the mock server rejects
pub const INVALID_REFRESH_TOKEN: &str = "invalid_refresh_token";

/// Scripted SP-API host
///
/// Replies with queued responses in order, then with `{"payload":{}}`.
#[derive(Default)]
pub struct MockTransport {
    queued: Mutex<VecDeque<HttpResponse>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.queued.lock().unwrap().push_back(HttpResponse::new(status, body));
        self
    }

    /// Queue the SP-API `Unauthorized` rejection
    pub fn reply_unauthorized(&self) -> &Self {
        self.reply(
            403,
            r#"{"errors":[{
                "code":"Unauthorized",
                "message":"Access to requested resource is denied.",
                "details":"The access token you provided has expired."
            }]}"#,
        )
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Access tokens sent, in order
    pub fn access_tokens(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.header_value("x-amz-access-token").map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.sent.lock().unwrap().push(request);
        let response = self.queued.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| HttpResponse::new(200, r#"{"payload":{}}"#)))
    }
}

/// Login with Amazon stand-in
///
/// Issues `Atza|<n>` access tokens, where `n` counts token requests.
pub struct MockAuthorizationServer {
    delay: Duration,
    expires_in: AtomicI64,
    calls: AtomicUsize,
    grants: Mutex<Vec<&'static str>>,
}

impl Default for MockAuthorizationServer {
    fn default() -> Self {
        Self::with_delay(Duration::from_millis(0))
    }
}

impl MockAuthorizationServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server that takes `delay` to answer each grant
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            expires_in: AtomicI64::new(3600),
            calls: AtomicUsize::new(0),
            grants: Mutex::new(Vec::new()),
        }
    }

    /// Lifetime in seconds of the tokens issued from now on
    pub fn set_expires_in(&self, seconds: i64) {
        self.expires_in.store(seconds, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `grant_type` of each request, in order
    pub fn grants(&self) -> Vec<&'static str> {
        self.grants.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthorizationServer for MockAuthorizationServer {
    async fn post_token(&self, grant: TokenGrant) -> Result<GrantedTokens> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let expires_in = self.expires_in.load(Ordering::SeqCst);
        self.grants.lock().unwrap().push(grant.grant_type());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match grant {
            TokenGrant::AuthorizationCode { code } if code == INVALID_AUTH_CODE => {
                Err(SpApiError::upstream(
                    "invalid_request",
                    "The request has an invalid parameter : code",
                    Some(400),
                ))
            }
            TokenGrant::RefreshToken { refresh_token }
                if refresh_token == INVALID_REFRESH_TOKEN =>
            {
                Err(SpApiError::upstream(
                    "invalid_grant",
                    "The request has an invalid grant parameter : refresh_token",
                    Some(400),
                ))
            }
            TokenGrant::AuthorizationCode { .. } => Ok(GrantedTokens {
                access_token: AccessToken::expiring_in(format!("Atza|{n}"), expires_in),
                refresh_token: Some(format!("Atzr|{n}")),
            }),
            _ => Ok(GrantedTokens {
                access_token: AccessToken::expiring_in(format!("Atza|{n}"), expires_in),
                refresh_token: None,
            }),
        }
    }
}

/// STS stand-in
#[derive(Default)]
pub struct MockRoleProvider {
    calls: AtomicUsize,
}

impl MockRoleProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleCredentialsProvider for MockRoleProvider {
    async fn assume_role(&self) -> Result<RoleCredentials> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RoleCredentials {
            access_key_id: format!("ASIA{n}"),
            secret_access_key: "role-secret".into(),
            session_token: Some("role-session".into()),
            expires_at: None,
        })
    }
}

/// Signer that records the key id and region in the `authorization` header
#[derive(Default)]
pub struct MockSigner;

#[async_trait]
impl RequestSigner for MockSigner {
    async fn sign(
        &self,
        request: HttpRequest,
        credentials: &RoleCredentials,
        aws_region: &str,
    ) -> Result<HttpRequest> {
        Ok(request.header(
            "authorization",
            format!("signed {} {aws_region}", credentials.access_key_id),
        ))
    }
}
