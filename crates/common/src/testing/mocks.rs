//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::auth::{LwaClientError, LwaClientTrait, OAuthError, TokenSet};

/// Mock LWA client
///
/// Every grant succeeds with a one hour token unless [`Self::fail_with`] was
/// called. Counters are shared between clones so a test can hand one clone
/// to the code under test and inspect another.
#[derive(Clone, Default)]
pub struct MockLwaClient {
    exchange_calls: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
    grantless_calls: Arc<AtomicUsize>,
    failure: Arc<Mutex<Option<OAuthError>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    expires_in: Arc<Mutex<Option<i64>>>,
}

impl MockLwaClient {
    /// Create a new mock LWA client with default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent grant fail with the given OAuth error payload.
    pub fn fail_with(&self, error: &str, description: &str) {
        *self.failure.lock().unwrap() = Some(OAuthError {
            error: error.to_string(),
            error_description: Some(description.to_string()),
        });
    }

    /// Let grants succeed again.
    pub fn succeed(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Sleep this long inside every grant (used to widen race windows).
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Lifetime in seconds of issued tokens (default 3600).
    pub fn set_expires_in(&self, seconds: i64) {
        *self.expires_in.lock().unwrap() = Some(seconds);
    }

    /// Number of authorization code exchanges performed.
    #[must_use]
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// Number of refresh token grants performed.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Number of client credentials grants performed.
    #[must_use]
    pub fn grantless_calls(&self) -> usize {
        self.grantless_calls.load(Ordering::SeqCst)
    }

    async fn issue(
        &self,
        counter: &AtomicUsize,
        access_token: String,
        refresh_token: Option<String>,
        scope: Option<String>,
    ) -> Result<TokenSet, LwaClientError> {
        let call = counter.fetch_add(1, Ordering::SeqCst) + 1;

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.lock().unwrap().clone();
        if let Some(error) = failure {
            return Err(LwaClientError::OAuth(error));
        }

        let expires_in = self.expires_in.lock().unwrap().unwrap_or(3600);
        Ok(TokenSet::new(format!("{access_token}-{call}"), refresh_token, expires_in, scope))
    }
}

#[async_trait]
impl LwaClientTrait for MockLwaClient {
    async fn exchange_code_for_tokens(&self, _code: &str) -> Result<TokenSet, LwaClientError> {
        self.issue(
            &self.exchange_calls,
            "mock_exchanged_access".to_string(),
            Some("mock_refresh_token".to_string()),
            None,
        )
        .await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenSet, LwaClientError> {
        if refresh_token.is_empty() {
            return Err(LwaClientError::NoRefreshToken);
        }
        self.issue(
            &self.refresh_calls,
            "mock_refreshed_access".to_string(),
            Some(refresh_token.to_string()),
            None,
        )
        .await
    }

    async fn client_credentials_token(&self, scope: &str) -> Result<TokenSet, LwaClientError> {
        self.issue(
            &self.grantless_calls,
            "mock_grantless_access".to_string(),
            None,
            Some(scope.to_string()),
        )
        .await
    }
}
