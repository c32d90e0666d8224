//! # spapi Domain
//!
//! Business domain types for the Selling Partner API client.
//!
//! This crate contains:
//! - Regions, HTTP verbs, grantless scopes and API version ordering
//! - Call input (`CallRequest`) and resolution output (`ResolvedCall`)
//! - Credential value types (access tokens, role credentials, token grants)
//! - Client configuration structures
//! - The `SpApiError` taxonomy and domain constants
//!
//! ## Architecture
//! - Depends only on `spapi-common` (foundation tier) for error
//!   classification
//! - No I/O, no async, no HTTP client
//! - Pure data structures shared by `spapi-core` and `spapi-infra`

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
