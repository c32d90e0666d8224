//! Selling Partner API client service
//!
//! [`SellingPartner`] ties the resolver, the credential manager and the
//! dispatcher together. It is cheap to clone; clones share the credential
//! cache.

use std::sync::Arc;

use spapi_domain::{
    AccessToken, CallRequest, CallResponse, ClientConfig, GrantedTokens, GrantlessScope, Region,
    ResolvedCall, Result, RoleCredentials, SpApiError, TokenScope,
};
use tracing::{info, instrument, warn};

use crate::catalog::OperationCatalog;
use crate::credentials::{Authorization, CredentialManager};
use crate::dispatch::RequestDispatcher;
use crate::ports::{AuthorizationServer, RequestSigner, RoleCredentialsProvider, Transport};
use crate::resolver::{OperationResolver, ResolverOptions};
use crate::validation::ConfigValidator;

/// Adapters a client is built with
#[derive(Clone)]
pub struct Collaborators {
    pub transport: Arc<dyn Transport>,
    pub authorization: Option<Arc<dyn AuthorizationServer>>,
    pub role_provider: Option<Arc<dyn RoleCredentialsProvider>>,
    pub signer: Option<Arc<dyn RequestSigner>>,
    /// Overrides the regional API host, e.g. for a local mock server
    pub api_base_url: Option<String>,
}

impl Collaborators {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            authorization: None,
            role_provider: None,
            signer: None,
            api_base_url: None,
        }
    }

    #[must_use]
    pub fn with_authorization(mut self, authorization: Arc<dyn AuthorizationServer>) -> Self {
        self.authorization = Some(authorization);
        self
    }

    #[must_use]
    pub fn with_role_provider(mut self, role_provider: Arc<dyn RoleCredentialsProvider>) -> Self {
        self.role_provider = Some(role_provider);
        self
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }
}

struct Inner {
    region: Region,
    catalog: Arc<OperationCatalog>,
    resolver: OperationResolver,
    credentials: CredentialManager,
    dispatcher: RequestDispatcher,
    auto_request_tokens: bool,
}

/// Selling Partner API client
#[derive(Clone)]
pub struct SellingPartner {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SellingPartner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SellingPartner").finish_non_exhaustive()
    }
}

impl SellingPartner {
    /// Validate `config` and build a client
    ///
    /// # Errors
    /// Returns the first configuration error found by [`ConfigValidator`]
    pub fn new(
        config: ClientConfig,
        catalog: Arc<OperationCatalog>,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let region = ConfigValidator::validate(&config, &catalog)?;

        let resolver = OperationResolver::new(
            Arc::clone(&catalog),
            config.endpoints_versions.clone(),
            ResolverOptions {
                version_fallback: config.options.version_fallback,
                only_grantless_operations: config.options.only_grantless_operations,
                use_sandbox: config.options.use_sandbox,
            },
        );
        let credentials = CredentialManager::new(
            &config,
            collaborators.authorization,
            collaborators.role_provider,
        );

        let mut dispatcher = RequestDispatcher::new(region, collaborators.transport);
        if let Some(signer) = collaborators.signer {
            dispatcher = dispatcher.with_signer(signer);
        }
        if let Some(user_agent) = &config.options.user_agent {
            dispatcher = dispatcher.with_user_agent(user_agent.clone());
        }
        if let Some(base_url) = collaborators.api_base_url {
            dispatcher = dispatcher.with_base_url(base_url);
        }

        info!(
            %region,
            sandbox = config.options.use_sandbox,
            grantless_only = config.options.only_grantless_operations,
            "selling partner client ready"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                region,
                catalog,
                resolver,
                credentials,
                dispatcher,
                auto_request_tokens: config.options.auto_request_tokens,
            }),
        })
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.inner.region
    }

    #[must_use]
    pub fn catalog(&self) -> &OperationCatalog {
        &self.inner.catalog
    }

    /// Resolve a call without sending it
    ///
    /// # Errors
    /// See [`OperationResolver::resolve`]
    pub fn resolve(&self, request: &CallRequest) -> Result<ResolvedCall> {
        self.inner.resolver.resolve(request)
    }

    /// Resolve, authorize and send a call
    ///
    /// A call rejected with `Unauthorized` is retried once with a freshly
    /// requested token when tokens are requested automatically.
    ///
    /// # Errors
    /// Resolution, credential, transport or upstream errors
    #[instrument(
        skip_all,
        fields(
            endpoint = request.endpoint.as_deref(),
            operation = request.operation.as_deref(),
            api_path = request.api_path.as_deref(),
        )
    )]
    pub async fn call_api(&self, request: CallRequest) -> Result<CallResponse> {
        let resolved = self.inner.resolver.resolve(&request)?;
        let restricted_data_token = request.restricted_data_token.as_deref();

        let authorization =
            self.inner.credentials.ensure_authorized(&resolved, restricted_data_token).await?;

        match self.send(&resolved, &authorization, &request).await {
            Err(err) if self.retries_after(&err, &authorization) => {
                warn!(call = %resolved.label(), "access token rejected, retrying with a new one");
                self.inner
                    .credentials
                    .invalidate(authorization.scope, &authorization.access_token)
                    .await;
                let authorization = self
                    .inner
                    .credentials
                    .ensure_authorized(&resolved, restricted_data_token)
                    .await?;
                self.send(&resolved, &authorization, &request).await
            }
            result => result,
        }
    }

    async fn send(
        &self,
        resolved: &ResolvedCall,
        authorization: &Authorization,
        request: &CallRequest,
    ) -> Result<CallResponse> {
        self.inner
            .dispatcher
            .dispatch(resolved, authorization, request.body.as_ref(), request.options.raw_result)
            .await
    }

    fn retries_after(&self, err: &SpApiError, authorization: &Authorization) -> bool {
        err.is_unauthorized() && self.inner.auto_request_tokens && !authorization.restricted
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    /// See [`CredentialManager::exchange`]
    pub async fn exchange(&self, code: &str) -> Result<GrantedTokens> {
        self.inner.credentials.exchange(code).await
    }

    /// Request a new access token now
    ///
    /// # Errors
    /// See [`CredentialManager::refresh_access_token`]
    pub async fn refresh_access_token(&self, scope: Option<GrantlessScope>) -> Result<AccessToken> {
        self.inner.credentials.refresh_access_token(scope).await
    }

    /// Cached seller-delegated access token, if any
    pub async fn access_token(&self) -> Option<AccessToken> {
        self.inner.credentials.cached_access_token(TokenScope::Delegated).await
    }

    /// Cached access token for a grantless scope, if any
    pub async fn grantless_access_token(&self, scope: GrantlessScope) -> Option<AccessToken> {
        self.inner.credentials.cached_access_token(TokenScope::Grantless(scope)).await
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.inner.credentials.refresh_token().await
    }

    /// Usable role credentials, assumed if needed
    ///
    /// # Errors
    /// See [`CredentialManager::role_credentials`]
    pub async fn role_credentials(&self) -> Result<RoleCredentials> {
        self.inner.credentials.role_credentials().await
    }

    /// Assume the role now
    ///
    /// # Errors
    /// See [`CredentialManager::refresh_role_credentials`]
    pub async fn refresh_role_credentials(&self) -> Result<RoleCredentials> {
        self.inner.credentials.refresh_role_credentials().await
    }
}
