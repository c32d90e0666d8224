//! Login with Amazon (LWA) OAuth 2.0 client
//!
//! The Selling Partner API authorizes every call with an LWA access token.
//! This module speaks the three token grants LWA offers:
//!
//! - **authorization_code**: exchange a code from the seller consent flow for
//!   a refresh token plus a first access token
//! - **refresh_token**: trade the long-lived refresh token for a fresh access
//!   token
//! - **client_credentials**: obtain a grantless token for a fixed scope
//!   (notifications, migration)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  LwaClientTrait  │  seam used by spapi-infra's authorization adapter
//! └────────┬─────────┘
//!          │
//!          └──► LwaClient   (reqwest, form-encoded POST to the token URL)
//! ```
//!
//! Upstream error payloads (`{"error": "...", "error_description": "..."}`)
//! are surfaced as [`OAuthError`] without rewriting code or description.
//!
//! # Module Organization
//!
//! - **[`types`]**: `TokenSet`, `TokenResponse`, `OAuthError`, `LwaConfig`
//! - **[`client`]**: HTTP client for the three grants
//! - **[`traits`]**: `LwaClientTrait` for dependency injection

pub mod client;
pub mod traits;
pub mod types;

pub use client::{LwaClient, LwaClientError};
pub use traits::LwaClientTrait;
pub use types::{
    LwaConfig, OAuthError, TokenResponse, TokenSet, DEFAULT_LWA_TOKEN_URL, MAX_TOKEN_LIFETIME_SECS,
};
