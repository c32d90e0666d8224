//! `Transport` port over [`HttpClient`]

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Method;
use spapi_core::Transport;
use spapi_domain::{HttpMethod, HttpRequest, HttpResponse, Result, SpApiError};
use tracing::debug;

use super::client::HttpClient;
use crate::errors::InfraError;

/// Sends SP-API requests with reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.http.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            // reqwest derives Host from the URL
            if name != "host" {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = self.http.send(builder).await?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(|err| SpApiError::from(InfraError::from(err)))?;

        debug!(status, bytes = body.len(), "response received");
        Ok(HttpResponse { status, headers, body })
    }
}
