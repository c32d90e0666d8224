//! Login with Amazon authorization server adapter

use std::sync::Arc;

use async_trait::async_trait;
use spapi_common::auth::{LwaClient, LwaClientTrait, LwaConfig, TokenSet};
use spapi_core::AuthorizationServer;
use spapi_domain::{AccessToken, GrantedTokens, Result, SpApiError, TokenGrant};

use crate::errors::InfraError;

/// Posts token grants to LWA
#[derive(Clone)]
pub struct LwaAuthorizationServer {
    client: Arc<dyn LwaClientTrait>,
}

impl LwaAuthorizationServer {
    /// Adapter over any LWA client implementation
    #[must_use]
    pub fn new(client: Arc<dyn LwaClientTrait>) -> Self {
        Self { client }
    }

    /// Adapter over a reqwest-backed [`LwaClient`]
    #[must_use]
    pub fn from_config(config: LwaConfig, http: reqwest::Client) -> Self {
        Self::new(Arc::new(LwaClient::with_http_client(config, http)))
    }
}

fn granted(tokens: TokenSet) -> GrantedTokens {
    GrantedTokens {
        access_token: AccessToken::new(tokens.access_token, tokens.expires_at),
        refresh_token: tokens.refresh_token,
    }
}

#[async_trait]
impl AuthorizationServer for LwaAuthorizationServer {
    async fn post_token(&self, grant: TokenGrant) -> Result<GrantedTokens> {
        let result = match &grant {
            TokenGrant::AuthorizationCode { code } => {
                self.client.exchange_code_for_tokens(code).await
            }
            TokenGrant::RefreshToken { refresh_token } => {
                self.client.refresh_access_token(refresh_token).await
            }
            TokenGrant::ClientCredentials { scope } => {
                self.client.client_credentials_token(scope.as_str()).await
            }
        };
        result.map(granted).map_err(|err| SpApiError::from(InfraError::from(err)))
    }
}
