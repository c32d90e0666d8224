//! Shared test helpers for `spapi-core` integration tests.
//!
//! In-memory implementations of the core ports so client tests can script
//! API and authorization server behaviour without a network.

#![allow(dead_code)]

pub mod mocks;

use std::sync::Arc;

use spapi_core::{Collaborators, OperationCatalog, SellingPartner};
use spapi_domain::{ClientConfig, Result};

pub use mocks::{MockAuthorizationServer, MockRoleProvider, MockSigner, MockTransport};

/// Client over the built-in catalog wired to the given mocks
pub fn client(
    config: ClientConfig,
    transport: &Arc<MockTransport>,
    lwa: &Arc<MockAuthorizationServer>,
) -> Result<SellingPartner> {
    let catalog = Arc::new(OperationCatalog::builtin()?);
    let collaborators = Collaborators::new(transport.clone()).with_authorization(lwa.clone());
    SellingPartner::new(config, catalog, collaborators)
}

pub fn seller_config() -> ClientConfig {
    ClientConfig::new("na", "Atzr|seed-refresh-token")
}
