//! AWS Signature Version 4

pub mod sigv4;

pub use sigv4::{sign_request, SigV4Signer};
