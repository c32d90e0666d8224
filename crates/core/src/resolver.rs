//! Operation resolution
//!
//! Turns a [`CallRequest`] into a [`ResolvedCall`]: picks the endpoint and
//! version, applies version fallback, enforces grantless-only and sandbox
//! restrictions, and substitutes path parameters.
//!
//! Resolution is a pure function of the catalog, the instance overrides and
//! the call; resolving the same call twice yields the same result.
//!
//! Endpoint precedence is explicit `endpoint` > dotted prefix
//! (`orders.getOrders`) > search of every endpoint for the bare name. Version
//! precedence is per-call `options.version` > `endpoints_versions` override >
//! the endpoint's default. Fallback never leaves the chosen endpoint and
//! searches its versions newest first.

use std::collections::BTreeMap;
use std::sync::Arc;

use spapi_domain::{
    param_to_string, path_placeholders, CallRequest, HttpMethod, OperationDescriptor, QueryParams,
    ResolvedCall, Result, SpApiError, VersionKey,
};
use tracing::{debug, warn};

use crate::catalog::OperationCatalog;

/// Instance-wide resolution settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub version_fallback: bool,
    pub only_grantless_operations: bool,
    pub use_sandbox: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { version_fallback: true, only_grantless_operations: false, use_sandbox: false }
    }
}

/// Resolves logical calls against a catalog
#[derive(Debug, Clone)]
pub struct OperationResolver {
    catalog: Arc<OperationCatalog>,
    endpoints_versions: BTreeMap<String, String>,
    options: ResolverOptions,
}

impl OperationResolver {
    /// `endpoints_versions` must already be validated against `catalog`
    #[must_use]
    pub fn new(
        catalog: Arc<OperationCatalog>,
        endpoints_versions: BTreeMap<String, String>,
        options: ResolverOptions,
    ) -> Self {
        Self { catalog, endpoints_versions, options }
    }

    #[must_use]
    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Resolve a call
    ///
    /// # Errors
    /// Returns the resolution error codes (`NO_OPERATION_GIVEN`,
    /// `ENDPOINT_NOT_FOUND`, `INVALID_VERSION`, ...) described on
    /// [`SpApiError`]
    pub fn resolve(&self, call: &CallRequest) -> Result<ResolvedCall> {
        let sandbox = call.options.use_sandbox.unwrap_or(self.options.use_sandbox);

        if let Some(api_path) = non_empty(call.api_path.as_deref()) {
            return Self::resolve_raw(api_path, call, sandbox);
        }

        let requested = non_empty(call.operation.as_deref()).ok_or(SpApiError::NoOperationGiven)?;
        let (prefix, operation) = match requested.split_once('.') {
            Some((prefix, name)) => (non_empty(Some(prefix)), name),
            None => (None, requested),
        };
        if operation.is_empty() {
            return Err(SpApiError::NoOperationGiven);
        }

        let endpoint = match non_empty(call.endpoint.as_deref()).or(prefix) {
            Some(endpoint) => endpoint,
            None => self.search_endpoint(operation)?,
        };
        let group = self
            .catalog
            .endpoint(endpoint)
            .ok_or_else(|| SpApiError::EndpointNotFound { endpoint: endpoint.to_string() })?;

        let version = non_empty(call.options.version.as_deref())
            .or_else(|| self.endpoints_versions.get(endpoint).map(String::as_str))
            .unwrap_or(group.default_version.as_str());

        if !VersionKey::is_well_formed(version)
            || (!group.has_version(version) && !self.options.version_fallback)
        {
            return Err(SpApiError::InvalidVersion {
                endpoint: endpoint.to_string(),
                version: version.to_string(),
            });
        }

        if !group.defines(operation) {
            return Err(if self.catalog.endpoints_defining(operation).is_empty() {
                SpApiError::OperationNotFound { operation: operation.to_string() }
            } else {
                SpApiError::InvalidOperationForEndpoint {
                    operation: operation.to_string(),
                    endpoint: endpoint.to_string(),
                }
            });
        }

        let (version, descriptor) = self.select_version(endpoint, version, operation)?;

        if self.options.only_grantless_operations && !descriptor.is_grantless() {
            return Err(SpApiError::InvalidOperationError { operation: operation.to_string() });
        }

        if sandbox {
            check_sandbox(descriptor, call, operation)?;
        }

        let mut query = call.query.clone();
        let path = substitute_path(&descriptor.path, &call.path, &mut query, operation)?;

        Ok(ResolvedCall {
            endpoint: Some(endpoint.to_string()),
            version: Some(version.to_string()),
            operation: Some(operation.to_string()),
            method: descriptor.method,
            path,
            query,
            grantless_scope: descriptor.grantless_scope,
            sandbox,
        })
    }

    fn resolve_raw(api_path: &str, call: &CallRequest, sandbox: bool) -> Result<ResolvedCall> {
        let method = call
            .method
            .as_deref()
            .and_then(|m| m.parse::<HttpMethod>().ok())
            .ok_or_else(|| SpApiError::NoValidMethodProvided { method: call.method.clone() })?;

        let mut query = call.query.clone();
        let path = substitute_path(api_path, &call.path, &mut query, api_path)?;

        Ok(ResolvedCall {
            endpoint: None,
            version: None,
            operation: None,
            method,
            path,
            query,
            grantless_scope: None,
            sandbox,
        })
    }

    fn search_endpoint(&self, operation: &str) -> Result<&str> {
        let candidates = self.catalog.endpoints_defining(operation);
        match candidates.as_slice() {
            [] => Err(SpApiError::OperationNotFound { operation: operation.to_string() }),
            [only] => Ok(*only),
            [first, ..] => {
                warn!(
                    operation,
                    endpoints = ?candidates,
                    chosen = *first,
                    "operation defined by several endpoints, pass an endpoint to disambiguate"
                );
                Ok(*first)
            }
        }
    }

    fn select_version<'a>(
        &'a self,
        endpoint: &str,
        version: &'a str,
        operation: &str,
    ) -> Result<(&'a str, &'a OperationDescriptor)> {
        if let Some(descriptor) = self.catalog.find_operation(endpoint, version, operation) {
            return Ok((version, descriptor));
        }

        if !self.options.version_fallback {
            return Err(SpApiError::OperationNotFoundForVersion {
                operation: operation.to_string(),
                endpoint: endpoint.to_string(),
                version: version.to_string(),
            });
        }

        self.catalog
            .versions_newest_first(endpoint)
            .into_iter()
            .find_map(|candidate| {
                self.catalog.find_operation(endpoint, candidate, operation).map(|d| (candidate, d))
            })
            .map(|(fallback, descriptor)| {
                debug!(endpoint, operation, requested = version, fallback, "version fallback");
                (fallback, descriptor)
            })
            .ok_or_else(|| SpApiError::OperationNotFound { operation: operation.to_string() })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Merged path and query parameters must equal one documented case exactly
fn check_sandbox(
    descriptor: &OperationDescriptor,
    call: &CallRequest,
    operation: &str,
) -> Result<()> {
    let mut supplied: BTreeMap<String, String> =
        call.query.iter().map(|(k, v)| (k.clone(), param_to_string(v))).collect();
    supplied.extend(call.path.iter().map(|(k, v)| (k.clone(), v.clone())));

    if descriptor.sandbox.iter().any(|case| case.matches(&supplied)) {
        Ok(())
    } else {
        Err(SpApiError::InvalidSandboxParameters { operation: operation.to_string() })
    }
}

/// Replace `{name}` placeholders
///
/// Values come from `path`, else from a query entry of the same name, which
/// is then removed from the query. Values are percent-encoded.
fn substitute_path(
    template: &str,
    path: &BTreeMap<String, String>,
    query: &mut QueryParams,
    operation: &str,
) -> Result<String> {
    let mut out = template.to_string();

    for name in path_placeholders(template) {
        let value = match path.get(name) {
            Some(value) => value.clone(),
            None => query.remove(name).map(|v| param_to_string(&v)).ok_or_else(|| {
                SpApiError::MissingPathParameter {
                    parameter: name.to_string(),
                    operation: operation.to_string(),
                }
            })?,
        };
        // Substituted values are encoded, so they never contain a later `{name}`.
        out = out.replacen(&format!("{{{name}}}"), &urlencoding::encode(&value), 1);
    }

    Ok(out)
}
