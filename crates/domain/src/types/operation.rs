//! Operation descriptors
//!
//! An operation is the unit the catalog stores: one HTTP verb on one path
//! template, optionally callable through a grantless token, with the set of
//! parameter combinations the sandbox accepts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// HTTP verbs accepted by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Uppercase verb as sent on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            _ => Err(format!("Invalid HttpMethod: {s}")),
        }
    }
}

/// Scope of a client-credentials (grantless) token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrantlessScope {
    #[serde(rename = "sellingpartnerapi::notifications")]
    Notifications,
    #[serde(rename = "sellingpartnerapi::migration")]
    Migration,
}

impl_domain_enum_conversions!(GrantlessScope {
    Notifications => "sellingpartnerapi::notifications",
    Migration => "sellingpartnerapi::migration",
});

impl GrantlessScope {
    /// Scope string sent with the client-credentials grant
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Notifications => "sellingpartnerapi::notifications",
            Self::Migration => "sellingpartnerapi::migration",
        }
    }
}

/// One documented sandbox request: the exact parameters it must carry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SandboxCase {
    pub params: BTreeMap<String, String>,
}

impl SandboxCase {
    /// Build a case from name/value pairs
    #[must_use]
    pub fn new<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self { params: params.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// Whether the merged call parameters are exactly this case
    #[must_use]
    pub fn matches(&self, supplied: &BTreeMap<String, String>) -> bool {
        &self.params == supplied
    }
}

/// Immutable description of one operation within one endpoint version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub method: HttpMethod,
    /// Path with `{name}` placeholders, e.g. `/orders/v0/orders/{orderId}`
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grantless_scope: Option<GrantlessScope>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sandbox: Vec<SandboxCase>,
}

impl OperationDescriptor {
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), grantless_scope: None, sandbox: Vec::new() }
    }

    /// Mark the operation as callable with a grantless token for `scope`
    #[must_use]
    pub const fn grantless(mut self, scope: GrantlessScope) -> Self {
        self.grantless_scope = Some(scope);
        self
    }

    /// Add a documented sandbox request
    #[must_use]
    pub fn sandbox_case(mut self, case: SandboxCase) -> Self {
        self.sandbox.push(case);
        self
    }

    #[must_use]
    pub const fn is_grantless(&self) -> bool {
        self.grantless_scope.is_some()
    }
}

/// Placeholder names in a path template, in order of appearance
///
/// Unterminated braces are treated as literal text.
#[must_use]
pub fn path_placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start + 1..].find('}') else { break };
        names.push(&rest[start + 1..start + 1 + len]);
        rest = &rest[start + 1 + len + 1..];
    }
    names
}
