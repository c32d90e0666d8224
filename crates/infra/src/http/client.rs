use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use spapi_domain::constants::{DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use spapi_domain::SpApiError;
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with built-in retry and timeout support.
///
/// Connection failures, timeouts and 5xx responses are retried with
/// exponential backoff. Every other response is returned as is.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client with default timeout, user agent and retry policy.
    ///
    /// # Errors
    /// Returns `CONFIG_ERROR` if the TLS backend cannot be initialized
    pub fn new() -> Result<Self, SpApiError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Underlying reqwest client, shared with the LWA client
    #[must_use]
    pub fn inner(&self) -> &ReqwestClient {
        &self.client
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// # Errors
    /// `TRANSPORT_ERROR` once all attempts failed without a response
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, SpApiError> {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let request = builder
                .try_clone()
                .ok_or_else(|| {
                    SpApiError::Transport("request body cannot be cloned for retry".into())
                })?
                .build()
                .map_err(|err| SpApiError::from(InfraError::from(err)))?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, url = %url.path(), "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) if response.status().is_server_error() && attempt < attempts => {
                    debug!(attempt, status = %response.status(), "server error, retrying");
                }
                Ok(response) => {
                    debug!(
                        attempt,
                        %method,
                        url = %url.path(),
                        status = %response.status(),
                        "received HTTP response"
                    );
                    return Ok(response);
                }
                Err(err) if attempt < attempts && should_retry_error(&err) => {
                    debug!(attempt, error = %err, "HTTP request failed, retrying");
                    last_error = Some(err);
                }
                Err(err) => return Err(InfraError::from(err).into()),
            }

            self.sleep_with_backoff(attempt).await;
        }

        Err(last_error.map_or_else(
            || SpApiError::Transport("http client exhausted retries without a response".into()),
            |err| InfraError::from(err).into(),
        ))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = u32::try_from(retry_number.saturating_sub(1).min(8)).unwrap_or(8);
        self.base_backoff.saturating_mul(1u32 << shift)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpClientBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    #[must_use]
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// # Errors
    /// Returns `CONFIG_ERROR` if the reqwest client cannot be built
    pub fn build(self) -> Result<HttpClient, SpApiError> {
        let client = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .no_proxy()
            .build()
            .map_err(|err| SpApiError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
