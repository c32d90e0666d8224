//! Construction-time configuration validation
//!
//! Runs once, before a client exists. Checks run in a fixed order and the
//! first failure wins:
//!
//! 1. refresh token present, unless `only_grantless_operations`
//! 2. region is one of `na`, `eu`, `fe`
//! 3. every `endpoints_versions` key names a catalog endpoint
//! 4. every `endpoints_versions` value is a version of that endpoint
//! 5. the catalog itself is consistent

use spapi_domain::{ClientConfig, Region, Result, SpApiError};

use crate::catalog::OperationCatalog;

/// Validates a [`ClientConfig`] against a catalog
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate `config` and return the parsed region
    ///
    /// # Errors
    /// Returns `NO_REFRESH_TOKEN_PROVIDED`, `NO_VALID_REGION_PROVIDED`,
    /// `VERSION_DEFINED_FOR_INVALID_ENDPOINTS`, `INVALID_VERSION_FOR_ENDPOINTS`
    /// or `INVALID_CATALOG`
    pub fn validate(config: &ClientConfig, catalog: &OperationCatalog) -> Result<Region> {
        let has_refresh_token =
            config.refresh_token.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !has_refresh_token && !config.options.only_grantless_operations {
            return Err(SpApiError::NoRefreshTokenProvided);
        }

        let region = config
            .region
            .as_deref()
            .and_then(|r| r.parse::<Region>().ok())
            .ok_or_else(|| SpApiError::NoValidRegionProvided { region: config.region.clone() })?;

        let unknown: Vec<String> = config
            .endpoints_versions
            .keys()
            .filter(|endpoint| !catalog.has_endpoint(endpoint))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(SpApiError::VersionDefinedForInvalidEndpoints { endpoints: unknown });
        }

        let invalid: Vec<String> = config
            .endpoints_versions
            .iter()
            .filter(|(endpoint, version)| {
                catalog.endpoint(endpoint).is_some_and(|group| !group.has_version(version))
            })
            .map(|(endpoint, version)| format!("{endpoint} ({version})"))
            .collect();
        if !invalid.is_empty() {
            return Err(SpApiError::InvalidVersionForEndpoints { endpoints: invalid });
        }

        catalog.validate()?;
        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> OperationCatalog {
        OperationCatalog::builtin().unwrap()
    }

    #[test]
    fn accepts_minimal_config() {
        let region =
            ConfigValidator::validate(&ClientConfig::new("eu", "Atzr|abc"), &catalog()).unwrap();
        assert_eq!(region, Region::Eu);
    }

    #[test]
    fn grantless_needs_no_refresh_token() {
        assert!(ConfigValidator::validate(&ClientConfig::grantless("fe"), &catalog()).is_ok());
    }

    #[test]
    fn missing_refresh_token() {
        let mut config = ClientConfig::new("na", "");
        assert_eq!(
            ConfigValidator::validate(&config, &catalog()).unwrap_err().code(),
            "NO_REFRESH_TOKEN_PROVIDED"
        );

        config.refresh_token = None;
        assert_eq!(
            ConfigValidator::validate(&config, &catalog()).unwrap_err().code(),
            "NO_REFRESH_TOKEN_PROVIDED"
        );
    }

    #[test]
    fn refresh_token_checked_before_region() {
        let config = ClientConfig { region: Some("de".into()), ..ClientConfig::default() };
        assert_eq!(
            ConfigValidator::validate(&config, &catalog()).unwrap_err().code(),
            "NO_REFRESH_TOKEN_PROVIDED"
        );
    }

    #[test]
    fn unsupported_regions() {
        for region in ["de", "us", "", "north-america"] {
            let err = ConfigValidator::validate(&ClientConfig::new(region, "Atzr|abc"), &catalog())
                .unwrap_err();
            assert_eq!(err.code(), "NO_VALID_REGION_PROVIDED", "region {region:?}");
        }

        let mut no_region = ClientConfig::new("na", "Atzr|abc");
        no_region.region = None;
        assert_eq!(
            ConfigValidator::validate(&no_region, &catalog()).unwrap_err().code(),
            "NO_VALID_REGION_PROVIDED"
        );
    }

    #[test]
    fn all_unknown_endpoints_are_reported() {
        let config = ClientConfig::new("na", "Atzr|abc")
            .with_endpoint_version("invalidEndpoint", "v0")
            .with_endpoint_version("alsoInvalid", "v1")
            .with_endpoint_version("sellers", "v1");

        match ConfigValidator::validate(&config, &catalog()).unwrap_err() {
            SpApiError::VersionDefinedForInvalidEndpoints { endpoints } => {
                assert_eq!(
                    endpoints,
                    vec!["alsoInvalid".to_string(), "invalidEndpoint".to_string()]
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn unknown_version_for_known_endpoint() {
        let config =
            ClientConfig::new("na", "Atzr|abc").with_endpoint_version("sellers", "unknownVersion");
        let err = ConfigValidator::validate(&config, &catalog()).unwrap_err();

        assert_eq!(err.code(), "INVALID_VERSION_FOR_ENDPOINTS");
        assert!(err.message().contains("sellers (unknownVersion)"));
    }
}
