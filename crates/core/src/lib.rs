//! # spapi Core
//!
//! Operation resolution, credential lifecycle and request dispatch for the
//! Selling Partner API, free of any concrete HTTP or crypto code.
//!
//! This crate contains:
//! - The operation catalog and its built-in table
//! - Construction-time configuration validation
//! - The operation resolver (endpoint/version selection, fallback, sandbox)
//! - The credential manager (single-flight token and role credential cache)
//! - The request dispatcher and the `SellingPartner` client service
//! - Port interfaces (traits) implemented by `spapi-infra`
//!
//! ## Architecture Principles
//! - Only depends on `spapi-domain`
//! - No HTTP client, no signing crypto, no file I/O
//! - All external collaborators via traits in [`ports`]

pub mod catalog;
pub mod client;
pub mod credentials;
pub mod dispatch;
pub mod ports;
pub mod resolver;
pub mod validation;

pub use catalog::{EndpointGroup, OperationCatalog};
pub use client::{Collaborators, SellingPartner};
pub use credentials::{Authorization, CredentialManager};
pub use dispatch::RequestDispatcher;
pub use ports::{AuthorizationServer, RequestSigner, RoleCredentialsProvider, Transport};
pub use resolver::{OperationResolver, ResolverOptions};
pub use validation::ConfigValidator;
