//! Selling Partner API regions

use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// Region an application is registered in
///
/// Selects the API host, the sandbox host and the AWS region used when
/// signing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// North America (US, CA, MX, BR)
    Na,
    /// Europe, Middle East, India
    Eu,
    /// Far East (JP, AU, SG)
    Fe,
}

impl_domain_enum_conversions!(Region {
    Na => "na",
    Eu => "eu",
    Fe => "fe",
});

impl Region {
    /// All supported regions
    pub const ALL: [Self; 3] = [Self::Na, Self::Eu, Self::Fe];

    /// Production API host
    #[must_use]
    pub const fn host(self) -> &'static str {
        match self {
            Self::Na => "sellingpartnerapi-na.amazon.com",
            Self::Eu => "sellingpartnerapi-eu.amazon.com",
            Self::Fe => "sellingpartnerapi-fe.amazon.com",
        }
    }

    /// Sandbox API host
    #[must_use]
    pub fn sandbox_host(self) -> String {
        format!("sandbox.{}", self.host())
    }

    /// Host for a call, sandbox aware
    #[must_use]
    pub fn host_for(self, sandbox: bool) -> String {
        if sandbox {
            self.sandbox_host()
        } else {
            self.host().to_string()
        }
    }

    /// AWS region used for SigV4 signing
    #[must_use]
    pub const fn aws_region(self) -> &'static str {
        match self {
            Self::Na => "us-east-1",
            Self::Eu => "eu-west-1",
            Self::Fe => "us-west-2",
        }
    }
}
