//! Credential lifecycle
//!
//! ```text
//!            exchange(code)            refresh (single flight)
//!  Empty ─────────────────────► Cached ◄──────────────── Refreshing
//!    │                           │  ▲                        ▲
//!    │                 expires / │  │ store                  │
//!    │               invalidate  ▼  │                        │
//!    └──────────────────────────► Empty ─────────────────────┘
//! ```
//!
//! - [`slot`]: one cache slot per token scope (delegated, each grantless
//!   scope) plus one for role credentials, each an explicit state machine
//!   whose in-flight refresh is a shared future late callers attach to
//! - [`manager`]: `CredentialManager`, which decides which slot a call needs
//!   and which grant refills it

pub mod manager;
pub mod slot;

pub use manager::{Authorization, CredentialManager};
pub use slot::CredentialSlot;
