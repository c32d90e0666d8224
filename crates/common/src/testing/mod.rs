//! Testing utilities and helpers
//!
//! - **[`mocks`]**: in-memory [`crate::auth::LwaClientTrait`] implementation
//!   that records grants and can be told to fail or stall
//!
//! ## Usage
//!
//! ```rust
//! use spapi_common::testing::MockLwaClient;
//!
//! let lwa = MockLwaClient::new();
//! lwa.fail_with("invalid_grant", "The request has an invalid grant parameter : refresh_token");
//! assert_eq!(lwa.refresh_calls(), 0);
//! ```

pub mod mocks;

pub use mocks::MockLwaClient;
