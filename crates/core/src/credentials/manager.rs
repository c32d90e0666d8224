//! Credential manager
//!
//! Owns the refresh token and every cached credential. Decides per call
//! whether a seller-delegated token or a grantless token is needed, whether
//! role credentials are needed, and which grant refills an empty slot.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use spapi_domain::constants::{ROLE_CREDENTIALS_EXPIRY_MARGIN_SECS, TOKEN_EXPIRY_MARGIN_SECS};
use spapi_domain::{
    AccessToken, ClientConfig, GrantedTokens, GrantlessScope, ResolvedCall, Result,
    RoleCredentials, SpApiError, TokenGrant, TokenScope,
};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::slot::CredentialSlot;
use crate::ports::{AuthorizationServer, RoleCredentialsProvider};

/// Credentials attached to one outbound call
#[derive(Debug, Clone)]
pub struct Authorization {
    pub scope: TokenScope,
    /// Access token, or the restricted data token supplied with the call
    pub access_token: AccessToken,
    /// Present when requests are signed and the call is not grantless
    pub role_credentials: Option<RoleCredentials>,
    pub restricted: bool,
}

/// OAuth2 token and role credential lifecycle
pub struct CredentialManager {
    authorization: Option<Arc<dyn AuthorizationServer>>,
    role_provider: Option<Arc<dyn RoleCredentialsProvider>>,
    refresh_token: Arc<RwLock<Option<String>>>,
    delegated: CredentialSlot<AccessToken>,
    notifications: CredentialSlot<AccessToken>,
    migration: CredentialSlot<AccessToken>,
    role: CredentialSlot<RoleCredentials>,
    auto_request_tokens: bool,
    sign_requests: bool,
}

impl CredentialManager {
    /// Seed the manager from `config`
    ///
    /// A caller-supplied access token is cached without expiry; it is used
    /// until the API rejects it.
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        authorization: Option<Arc<dyn AuthorizationServer>>,
        role_provider: Option<Arc<dyn RoleCredentialsProvider>>,
    ) -> Self {
        let refresh_token = config.refresh_token.clone().filter(|t| !t.trim().is_empty());
        let access_token = config
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| AccessToken::new(t, None));

        Self {
            authorization,
            role_provider,
            refresh_token: Arc::new(RwLock::new(refresh_token)),
            delegated: CredentialSlot::new(access_token),
            notifications: CredentialSlot::default(),
            migration: CredentialSlot::default(),
            role: CredentialSlot::new(config.role_credentials.clone()),
            auto_request_tokens: config.options.auto_request_tokens,
            sign_requests: config.options.sign_requests,
        }
    }

    fn slot(&self, scope: TokenScope) -> &CredentialSlot<AccessToken> {
        match scope {
            TokenScope::Delegated => &self.delegated,
            TokenScope::Grantless(GrantlessScope::Notifications) => &self.notifications,
            TokenScope::Grantless(GrantlessScope::Migration) => &self.migration,
        }
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.refresh_token.read().await.clone()
    }

    /// Cached token for `scope`, fresh or not
    pub async fn cached_access_token(&self, scope: TokenScope) -> Option<AccessToken> {
        self.slot(scope).cached().await
    }

    /// Exchange an authorization code for a refresh token and access token
    ///
    /// Both are stored; later delegated calls use them.
    ///
    /// # Errors
    /// Upstream rejections pass through unchanged, e.g. `invalid_request` /
    /// `"The request has an invalid parameter : code"`
    #[instrument(skip(self, code))]
    pub async fn exchange(&self, code: &str) -> Result<GrantedTokens> {
        let server = self.authorization.as_ref().ok_or_else(missing_lwa_credentials)?;
        let granted =
            server.post_token(TokenGrant::AuthorizationCode { code: code.to_string() }).await?;

        if let Some(refresh_token) = &granted.refresh_token {
            *self.refresh_token.write().await = Some(refresh_token.clone());
        }
        self.delegated.store(granted.access_token.clone()).await;

        info!("authorization code exchanged");
        Ok(granted)
    }

    /// Request a new access token now
    ///
    /// With a grantless `scope` a client-credentials token for that scope is
    /// requested; without one the refresh token is used.
    ///
    /// # Errors
    /// `NO_SCOPE_PROVIDED` without refresh token and scope; upstream
    /// rejections (`invalid_grant`) pass through unchanged
    #[instrument(skip(self))]
    pub async fn refresh_access_token(&self, scope: Option<GrantlessScope>) -> Result<AccessToken> {
        let scope = match scope {
            Some(grantless) => TokenScope::Grantless(grantless),
            None if self.refresh_token.read().await.is_some() => TokenScope::Delegated,
            None => return Err(SpApiError::NoScopeProvided),
        };
        self.slot(scope).refresh(|| self.token_refresh(scope)).await
    }

    /// Usable access token for `scope`, refreshed once if missing or expired
    ///
    /// # Errors
    /// `NO_ACCESS_TOKEN_AND_OR_ROLE_CREDENTIALS_PRESENT` when no usable token
    /// is cached and `auto_request_tokens` is off; otherwise refresh errors
    pub async fn access_token(&self, scope: TokenScope) -> Result<AccessToken> {
        let slot = self.slot(scope);
        if !self.auto_request_tokens {
            return match slot.cached().await {
                Some(token) if token.is_usable(TOKEN_EXPIRY_MARGIN_SECS) => Ok(token),
                _ => Err(SpApiError::NoAccessTokenAndOrRoleCredentialsPresent),
            };
        }
        slot.get_or_refresh(|t| t.is_usable(TOKEN_EXPIRY_MARGIN_SECS), || self.token_refresh(scope))
            .await
    }

    /// Usable role credentials, assumed once if missing or expired
    ///
    /// # Errors
    /// `NO_ACCESS_TOKEN_AND_OR_ROLE_CREDENTIALS_PRESENT` when none are cached
    /// and `auto_request_tokens` is off, `CREDENTIALS_MISSING` without a role
    /// provider, or the provider's error
    pub async fn role_credentials(&self) -> Result<RoleCredentials> {
        if !self.auto_request_tokens {
            return match self.role.cached().await {
                Some(creds) if creds.is_usable(ROLE_CREDENTIALS_EXPIRY_MARGIN_SECS) => Ok(creds),
                _ => Err(SpApiError::NoAccessTokenAndOrRoleCredentialsPresent),
            };
        }
        self.role
            .get_or_refresh(
                |c| c.is_usable(ROLE_CREDENTIALS_EXPIRY_MARGIN_SECS),
                || self.role_refresh(),
            )
            .await
    }

    /// Assume the role now
    ///
    /// # Errors
    /// `CREDENTIALS_MISSING` without a role provider, or the provider's error
    #[instrument(skip(self))]
    pub async fn refresh_role_credentials(&self) -> Result<RoleCredentials> {
        self.role.refresh(|| self.role_refresh()).await
    }

    /// Credentials for a resolved call
    ///
    /// Grantless calls get a token for their scope and never role
    /// credentials. Other calls get the delegated token (or the supplied
    /// restricted data token) and, when signing is on, role credentials.
    ///
    /// # Errors
    /// See [`Self::access_token`] and [`Self::role_credentials`]
    pub async fn ensure_authorized(
        &self,
        resolved: &ResolvedCall,
        restricted_data_token: Option<&str>,
    ) -> Result<Authorization> {
        let scope = resolved.grantless_scope.map_or(TokenScope::Delegated, TokenScope::Grantless);

        let (access_token, restricted) = match restricted_data_token {
            Some(rdt) if !resolved.is_grantless() => (AccessToken::new(rdt, None), true),
            _ => (self.access_token(scope).await?, false),
        };

        let role_credentials = if self.sign_requests && !resolved.is_grantless() {
            Some(self.role_credentials().await?)
        } else {
            None
        };

        Ok(Authorization { scope, access_token, role_credentials, restricted })
    }

    /// Drop `rejected` from the cache for `scope` so the next call refreshes
    pub async fn invalidate(&self, scope: TokenScope, rejected: &AccessToken) -> bool {
        let dropped = self.slot(scope).invalidate(rejected).await;
        if dropped {
            debug!(%scope, "access token invalidated");
        }
        dropped
    }

    fn token_refresh(&self, scope: TokenScope) -> BoxFuture<'static, Result<AccessToken>> {
        let authorization = self.authorization.clone();
        let refresh_token = Arc::clone(&self.refresh_token);

        async move {
            let grant = match scope {
                TokenScope::Grantless(scope) => TokenGrant::ClientCredentials { scope },
                TokenScope::Delegated => {
                    let token =
                        refresh_token.read().await.clone().ok_or(SpApiError::NoScopeProvided)?;
                    TokenGrant::RefreshToken { refresh_token: token }
                }
            };
            let server = authorization.ok_or_else(missing_lwa_credentials)?;

            debug!(%scope, grant_type = grant.grant_type(), "requesting access token");
            let granted = server.post_token(grant).await?;

            if let Some(rotated) = granted.refresh_token {
                *refresh_token.write().await = Some(rotated);
            }
            info!(%scope, expires_at = ?granted.access_token.expires_at, "access token refreshed");
            Ok(granted.access_token)
        }
        .boxed()
    }

    fn role_refresh(&self) -> BoxFuture<'static, Result<RoleCredentials>> {
        let provider = self.role_provider.clone();

        async move {
            let provider = provider.ok_or_else(|| {
                SpApiError::CredentialsMissing(
                    "AWS access key, secret key and role ARN are required to sign requests"
                        .to_string(),
                )
            })?;
            let credentials = provider.assume_role().await?;
            info!(expires_at = ?credentials.expires_at, "role credentials refreshed");
            Ok(credentials)
        }
        .boxed()
    }
}

fn missing_lwa_credentials() -> SpApiError {
    SpApiError::CredentialsMissing("LWA client id and client secret are required".to_string())
}
