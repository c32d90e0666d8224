//! Call input and output
//!
//! [`CallRequest`] is what a caller hands to `call_api`. The resolver turns
//! it into a [`ResolvedCall`]; the dispatcher turns the transport response
//! into a [`CallResponse`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::operation::{GrantlessScope, HttpMethod};

/// Query parameters; arrays are sent comma-joined
pub type QueryParams = BTreeMap<String, Value>;

/// String form of a parameter value as it appears in a URL
///
/// Strings are taken as-is, arrays are comma-joined, `null` is empty.
#[must_use]
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(param_to_string).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// Per-call options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    /// Version to call, overriding instance and catalog defaults
    pub version: Option<String>,
    /// Overrides the instance `use_sandbox` option for this call
    pub use_sandbox: Option<bool>,
    /// Keep the full response body instead of unwrapping `payload`
    pub raw_result: bool,
}

/// A logical API call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallRequest {
    /// Bare (`getOrders`) or dotted (`orders.getOrders`) operation name
    pub operation: Option<String>,
    pub endpoint: Option<String>,
    /// Raw path, bypassing the catalog; requires `method`
    pub api_path: Option<String>,
    pub method: Option<String>,
    /// Values for `{name}` placeholders in the path template
    pub path: BTreeMap<String, String>,
    pub query: QueryParams,
    pub body: Option<Value>,
    /// Sent instead of the access token for restricted operations
    pub restricted_data_token: Option<String>,
    pub options: CallOptions,
}

impl CallRequest {
    /// Call a catalog operation
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self { operation: Some(operation.into()), ..Self::default() }
    }

    /// Call a raw path with an explicit HTTP method
    #[must_use]
    pub fn raw(api_path: impl Into<String>, method: impl Into<String>) -> Self {
        Self { api_path: Some(api_path.into()), method: Some(method.into()), ..Self::default() }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.options.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_sandbox(mut self, use_sandbox: bool) -> Self {
        self.options.use_sandbox = Some(use_sandbox);
        self
    }

    #[must_use]
    pub fn with_raw_result(mut self, raw_result: bool) -> Self {
        self.options.raw_result = raw_result;
        self
    }

    #[must_use]
    pub fn with_restricted_data_token(mut self, token: impl Into<String>) -> Self {
        self.restricted_data_token = Some(token.into());
        self
    }
}

/// Output of operation resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    /// `None` for raw `api_path` calls
    pub endpoint: Option<String>,
    pub version: Option<String>,
    pub operation: Option<String>,
    pub method: HttpMethod,
    /// Path with placeholders substituted
    pub path: String,
    /// Query parameters left after path substitution
    pub query: QueryParams,
    pub grantless_scope: Option<GrantlessScope>,
    pub sandbox: bool,
}

impl ResolvedCall {
    #[must_use]
    pub const fn is_grantless(&self) -> bool {
        self.grantless_scope.is_some()
    }

    /// `endpoint.operation` label used in logs
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.endpoint, &self.operation) {
            (Some(endpoint), Some(operation)) => format!("{endpoint}.{operation}"),
            _ => format!("{} {}", self.method, self.path),
        }
    }
}

/// Normalized API response
#[derive(Debug, Clone, PartialEq)]
pub struct CallResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body; `payload` is unwrapped unless `raw_result` was set,
    /// non-JSON bodies are kept as a string, empty bodies are `null`
    pub body: Value,
}

impl CallResponse {
    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }

    /// Deserialize the body into a typed value
    ///
    /// # Errors
    /// Returns the serde error if the body does not match `T`
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.body)
    }
}
