//! Authorization adapters
//!
//! - [`LwaAuthorizationServer`]: the core `AuthorizationServer` port over the
//!   Login with Amazon client from `spapi-common`
//! - [`StsRoleProvider`]: the `RoleCredentialsProvider` port over AWS STS
//!   `AssumeRole`

pub mod lwa;
pub mod sts;

pub use lwa::LwaAuthorizationServer;
pub use sts::StsRoleProvider;
