//! Wires the reqwest, LWA, STS and SigV4 adapters into a [`SellingPartner`]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use spapi_common::auth::LwaConfig;
use spapi_core::{Collaborators, OperationCatalog, SellingPartner, Transport};
use spapi_domain::{ClientConfig, Result};
use tracing::debug;

use crate::auth::{LwaAuthorizationServer, StsRoleProvider};
use crate::catalog::load_catalog;
use crate::config;
use crate::http::{HttpClient, ReqwestTransport};
use crate::signing::SigV4Signer;

/// Builds a production [`SellingPartner`]
///
/// ```no_run
/// # async fn run() -> spapi_domain::Result<()> {
/// use spapi_domain::{AppCredentials, CallRequest, ClientConfig};
/// use spapi_infra::SellingPartnerBuilder;
///
/// let config = ClientConfig::new("eu", "Atzr|...")
///     .with_credentials(AppCredentials::lwa("amzn1.application-oa2-client.x", "secret"));
/// let client = SellingPartnerBuilder::new(config).build()?;
/// let response = client.call_api(CallRequest::new("getMarketplaceParticipations")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SellingPartnerBuilder {
    config: ClientConfig,
    catalog: Option<Arc<OperationCatalog>>,
    catalog_path: Option<PathBuf>,
    http: Option<HttpClient>,
    token_url: Option<String>,
    sts_endpoint: Option<String>,
    api_base_url: Option<String>,
}

impl SellingPartnerBuilder {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            catalog: None,
            catalog_path: None,
            http: None,
            token_url: None,
            sts_endpoint: None,
            api_base_url: None,
        }
    }

    /// Builder over [`config::load`]
    ///
    /// # Errors
    /// Returns `CONFIG_ERROR` if no configuration can be loaded
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(config::load()?))
    }

    /// Use `catalog` instead of the built-in one
    #[must_use]
    pub fn catalog(mut self, catalog: Arc<OperationCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Load the catalog from a JSON file at build time
    #[must_use]
    pub fn catalog_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Share an already configured HTTP client
    #[must_use]
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    #[must_use]
    pub fn token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    #[must_use]
    pub fn sts_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sts_endpoint = Some(endpoint.into());
        self
    }

    /// Send API calls to `base_url` instead of the regional host
    #[must_use]
    pub fn api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(base_url.into());
        self
    }

    /// # Errors
    /// Catalog loading errors, HTTP client setup errors, or the first
    /// configuration error found while validating the client config
    pub fn build(self) -> Result<SellingPartner> {
        let catalog = match (self.catalog, &self.catalog_path) {
            (Some(catalog), _) => catalog,
            (None, Some(path)) => Arc::new(load_catalog(path)?),
            (None, None) => Arc::new(OperationCatalog::builtin()?),
        };

        let http = match self.http {
            Some(http) => http,
            None => http_client(&self.config)?,
        };
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(http.clone()));
        let mut collaborators = Collaborators::new(Arc::clone(&transport));

        let credentials = &self.config.credentials;
        if let (Some(client_id), Some(client_secret)) =
            (&credentials.client_id, &credentials.client_secret)
        {
            let mut lwa = LwaConfig::new(client_id.clone(), client_secret.clone());
            if let Some(token_url) = self.token_url {
                lwa = lwa.with_token_url(token_url);
            }
            collaborators = collaborators.with_authorization(Arc::new(
                LwaAuthorizationServer::from_config(lwa, http.inner().clone()),
            ));
        }

        if self.config.options.sign_requests {
            if let (Some(key_id), Some(secret), Some(role_arn)) = (
                &credentials.aws_access_key_id,
                &credentials.aws_secret_access_key,
                &credentials.role_arn,
            ) {
                let mut sts = StsRoleProvider::new(transport, key_id, secret, role_arn);
                if let Some(endpoint) = self.sts_endpoint {
                    sts = sts.with_endpoint(endpoint);
                }
                collaborators = collaborators.with_role_provider(Arc::new(sts));
            }
            collaborators = collaborators.with_signer(Arc::new(SigV4Signer::execute_api()));
        }

        if let Some(base_url) = self.api_base_url {
            collaborators = collaborators.with_api_base_url(base_url);
        }

        debug!(
            lwa = collaborators.authorization.is_some(),
            sts = collaborators.role_provider.is_some(),
            "adapters wired"
        );

        SellingPartner::new(self.config, catalog, collaborators)
    }
}

fn http_client(config: &ClientConfig) -> Result<HttpClient> {
    let mut builder = HttpClient::builder();
    if let Some(timeout_ms) = config.options.timeout_ms {
        builder = builder.timeout(Duration::from_millis(timeout_ms));
    }
    if let Some(user_agent) = &config.options.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use spapi_domain::{AppCredentials, ClientOptions};

    use super::*;

    #[test]
    fn builds_with_builtin_catalog() {
        let config = ClientConfig::new("na", "Atzr|x")
            .with_credentials(AppCredentials::lwa("id", "secret"));
        let client = SellingPartnerBuilder::new(config).build().unwrap();
        assert!(client.catalog().has_endpoint("sellers"));
    }

    #[test]
    fn invalid_region_fails_the_build() {
        let err =
            SellingPartnerBuilder::new(ClientConfig::new("mars", "Atzr|x")).build().unwrap_err();
        assert_eq!(err.code(), "NO_VALID_REGION_PROVIDED");
    }

    #[test]
    fn missing_catalog_file_fails_the_build() {
        let err = SellingPartnerBuilder::new(ClientConfig::new("eu", "Atzr|x"))
            .catalog_file("/nonexistent/catalog.json")
            .build()
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn signing_without_aws_keys_still_builds() {
        let config = ClientConfig::new("fe", "Atzr|x")
            .with_options(ClientOptions { sign_requests: true, ..ClientOptions::default() });
        assert!(SellingPartnerBuilder::new(config).build().is_ok());
    }
}
