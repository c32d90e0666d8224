//! Port interfaces for the Selling Partner API client
//!
//! These traits define the boundaries between the dispatch and credential
//! logic in this crate and the adapters in `spapi-infra`.

use async_trait::async_trait;
use spapi_domain::{GrantedTokens, HttpRequest, HttpResponse, Result, RoleCredentials, TokenGrant};

/// Sends fully built requests over the network
///
/// Timeouts and transport-level retries are the implementation's concern.
/// Non-2xx responses are returned as `Ok`; only failures to obtain a response
/// are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Signs outbound requests with role credentials
#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// Return `request` with signature headers added
    async fn sign(
        &self,
        request: HttpRequest,
        credentials: &RoleCredentials,
        aws_region: &str,
    ) -> Result<HttpRequest>;
}

/// OAuth2 authorization server (Login with Amazon)
#[async_trait]
pub trait AuthorizationServer: Send + Sync {
    /// Post a token grant
    ///
    /// Rejections surface as `SpApiError::Upstream` with the server's error
    /// code and description unchanged.
    async fn post_token(&self, grant: TokenGrant) -> Result<GrantedTokens>;
}

/// Source of temporary role credentials for request signing
#[async_trait]
pub trait RoleCredentialsProvider: Send + Sync {
    /// Assume the application's role
    async fn assume_role(&self) -> Result<RoleCredentials>;
}
