//! Operation catalog
//!
//! Registry of endpoint groups → versions → operations, stored as nested
//! ordered maps. A catalog is an immutable value: it is built once (from the
//! built-in table in [`builtin`] or from a JSON catalog file), validated, and
//! then shared behind an `Arc` by every client that uses it.
//!
//! ## Catalog file format
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "endpoints": {
//!     "sellers": {
//!       "default_version": "v1",
//!       "versions": {
//!         "v1": {
//!           "getMarketplaceParticipations": {
//!             "method": "GET",
//!             "path": "/sellers/v1/marketplaceParticipations",
//!             "sandbox": [{}]
//!           }
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

pub mod builtin;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spapi_domain::constants::CATALOG_FORMAT_VERSION;
use spapi_domain::{OperationDescriptor, Result, SpApiError, VersionKey};

/// Operations of one endpoint version, keyed by operation name
pub type OperationSet = BTreeMap<String, OperationDescriptor>;

/// One endpoint group and its versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointGroup {
    /// Version used when neither the call nor the instance names one
    pub default_version: String,
    pub versions: BTreeMap<String, OperationSet>,
}

impl EndpointGroup {
    /// Start a group whose default version is `default_version`
    #[must_use]
    pub fn new(default_version: impl Into<String>) -> Self {
        Self { default_version: default_version.into(), versions: BTreeMap::new() }
    }

    /// Add a version with its operations
    #[must_use]
    pub fn version<'a>(
        mut self,
        version: impl Into<String>,
        operations: impl IntoIterator<Item = (&'a str, OperationDescriptor)>,
    ) -> Self {
        let set = operations.into_iter().map(|(name, op)| (name.to_string(), op)).collect();
        self.versions.insert(version.into(), set);
        self
    }

    #[must_use]
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }

    /// Whether any version defines `operation`
    #[must_use]
    pub fn defines(&self, operation: &str) -> bool {
        self.versions.values().any(|set| set.contains_key(operation))
    }

    /// Version strings ordered newest first
    ///
    /// Dated versions are newer than `v<N>` versions; dates compare
    /// chronologically and `v<N>` numerically.
    #[must_use]
    pub fn versions_newest_first(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self.versions.keys().map(String::as_str).collect();
        versions.sort_by_key(|v| std::cmp::Reverse(VersionKey::parse(v)));
        versions
    }
}

/// Read-only registry of endpoint groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCatalog {
    endpoints: BTreeMap<String, EndpointGroup>,
}

#[derive(Deserialize, Serialize)]
struct CatalogFile {
    format_version: u32,
    endpoints: BTreeMap<String, EndpointGroup>,
}

impl OperationCatalog {
    /// Build and validate a catalog from endpoint groups
    ///
    /// # Errors
    /// Returns [`SpApiError::InvalidCatalog`] if any group violates the
    /// catalog invariants (see [`OperationCatalog::validate`])
    pub fn from_endpoints<'a>(
        endpoints: impl IntoIterator<Item = (&'a str, EndpointGroup)>,
    ) -> Result<Self> {
        let catalog = Self {
            endpoints: endpoints
                .into_iter()
                .map(|(name, group)| (name.to_string(), group))
                .collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a JSON catalog file
    ///
    /// # Errors
    /// Returns [`SpApiError::InvalidCatalog`] for malformed JSON, an
    /// unsupported `format_version` or broken invariants
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| SpApiError::InvalidCatalog(format!("malformed catalog file: {e}")))?;
        if file.format_version != CATALOG_FORMAT_VERSION {
            return Err(SpApiError::InvalidCatalog(format!(
                "unsupported catalog format_version {} (expected {CATALOG_FORMAT_VERSION})",
                file.format_version
            )));
        }
        let catalog = Self { endpoints: file.endpoints };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Serialize to the JSON catalog file format
    ///
    /// # Errors
    /// Returns [`SpApiError::Serialization`] if serialization fails
    pub fn to_json(&self) -> Result<String> {
        let file = CatalogFile {
            format_version: CATALOG_FORMAT_VERSION,
            endpoints: self.endpoints.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Check the catalog invariants
    ///
    /// Every endpoint has at least one version, its default version exists,
    /// and every version string is `v<N>` or `YYYY-MM-DD`.
    ///
    /// # Errors
    /// Returns [`SpApiError::InvalidCatalog`] naming the first violation
    pub fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(SpApiError::InvalidCatalog("catalog defines no endpoints".to_string()));
        }
        for (name, group) in &self.endpoints {
            if group.versions.is_empty() {
                return Err(SpApiError::InvalidCatalog(format!("endpoint {name} has no versions")));
            }
            if !group.has_version(&group.default_version) {
                return Err(SpApiError::InvalidCatalog(format!(
                    "endpoint {name} declares default version {} which it does not define",
                    group.default_version
                )));
            }
            if let Some(bad) = group.versions.keys().find(|v| !VersionKey::is_well_formed(v)) {
                return Err(SpApiError::InvalidCatalog(format!(
                    "endpoint {name} has malformed version {bad}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn list_endpoints(&self) -> Vec<&str> {
        self.endpoints.keys().map(String::as_str).collect()
    }

    /// Versions of `endpoint` in catalog order, `None` for unknown endpoints
    #[must_use]
    pub fn list_versions(&self, endpoint: &str) -> Option<Vec<&str>> {
        self.endpoints
            .get(endpoint)
            .map(|group| group.versions.keys().map(String::as_str).collect())
    }

    #[must_use]
    pub fn list_operations(&self, endpoint: &str, version: &str) -> Option<Vec<&str>> {
        self.endpoints
            .get(endpoint)
            .and_then(|group| group.versions.get(version))
            .map(|set| set.keys().map(String::as_str).collect())
    }

    #[must_use]
    pub fn find_operation(
        &self,
        endpoint: &str,
        version: &str,
        operation: &str,
    ) -> Option<&OperationDescriptor> {
        self.endpoints.get(endpoint)?.versions.get(version)?.get(operation)
    }

    #[must_use]
    pub fn endpoint(&self, endpoint: &str) -> Option<&EndpointGroup> {
        self.endpoints.get(endpoint)
    }

    #[must_use]
    pub fn has_endpoint(&self, endpoint: &str) -> bool {
        self.endpoints.contains_key(endpoint)
    }

    /// Endpoints defining `operation` in any version, in catalog order
    #[must_use]
    pub fn endpoints_defining(&self, operation: &str) -> Vec<&str> {
        self.endpoints
            .iter()
            .filter(|(_, group)| group.defines(operation))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    #[must_use]
    pub fn versions_newest_first(&self, endpoint: &str) -> Vec<&str> {
        self.endpoints.get(endpoint).map(EndpointGroup::versions_newest_first).unwrap_or_default()
    }
}
