//! # spapi Infrastructure
//!
//! Infrastructure implementations of the `spapi-core` ports.
//!
//! This crate contains:
//! - The reqwest HTTP client and `Transport` adapter
//! - The Login with Amazon authorization server adapter
//! - AWS STS role assumption and Signature Version 4 request signing
//! - Configuration and catalog file loading
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `spapi-core`
//! - Depends on `spapi-common`, `spapi-domain` and `spapi-core`
//! - Contains all "impure" code (network, file system, clock)

pub mod auth;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod signing;

// Re-export commonly used items
pub use auth::{LwaAuthorizationServer, StsRoleProvider};
pub use builder::SellingPartnerBuilder;
pub use catalog::load_catalog;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, ReqwestTransport};
pub use observability::{init_tracing, LogFormat};
pub use signing::{sign_request, SigV4Signer};
