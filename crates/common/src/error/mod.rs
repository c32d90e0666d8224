//! Common error classification shared by every spapi layer
//!
//! Each layer owns its error enum (`SpApiError` in the domain crate,
//! `LwaClientError` in [`crate::auth`]). What they share is the way callers
//! reason about them:
//!
//! 1. **`ErrorClassification` trait**: retryability, severity, criticality and
//!    a suggested retry delay.
//! 2. **`ErrorSeverity` enum**: a unified severity level used when logging
//!    failures.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Expected conditions | Operation not found in catalog |
//! | **Warning** | Degraded but operational | Throttling, expired token |
//! | **Error** | Failure requiring attention | Rejected refresh token, bad config |
//! | **Critical** | Integrity at risk | Broken catalog invariants |
//!
//! ## Using ErrorClassification for logging
//!
//! ```rust,ignore
//! use spapi_common::error::{ErrorClassification, ErrorSeverity};
//!
//! fn log_failure<E: ErrorClassification + std::fmt::Display>(err: &E) {
//!     match err.severity() {
//!         ErrorSeverity::Critical | ErrorSeverity::Error => tracing::error!(%err, "call failed"),
//!         ErrorSeverity::Warning => tracing::warn!(%err, "call failed"),
//!         ErrorSeverity::Info => tracing::debug!(%err, "call failed"),
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

/// Standard error classification interface
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as transport timeouts or throttling.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    ///
    /// Returns `Some(Duration)` when a specific delay is recommended (e.g.
    /// from a `Retry-After` header), `None` otherwise.
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl ErrorSeverity {
    /// Stable lowercase label for structured log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
