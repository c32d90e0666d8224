//! HTTP plumbing
//!
//! [`HttpClient`] wraps reqwest with retries; [`ReqwestTransport`] adapts it
//! to the core `Transport` port.

pub mod client;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use transport::ReqwestTransport;
