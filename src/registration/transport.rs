//! HTTP transport to the management core.
//!
//! # Responsibilities
//! - Issue POST/DELETE requests to the configured core `host:port`
//! - Return the response body as text, whatever the status code
//! - Map connection failures and timeouts to `TransportError`
//!
//! # Design Decisions
//! - Timeouts belong to this layer (`core.request_timeout_secs`)
//! - No retries: a failed request is reported once

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::schema::CoreConfig;

/// Request methods used by the registration protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Delete,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Post => f.write_str("POST"),
            Method::Delete => f.write_str("DELETE"),
        }
    }
}

/// Transport-level failure, carrying a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Request/response channel to the management core.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String, TransportError>;
}

/// `Transport` backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for the core described by `config`.
    pub fn new(config: &CoreConfig) -> Result<Self, TransportError> {
        let base_url = Url::parse(&format!("http://{}:{}", config.host, config.port))
            .map_err(|e| {
                TransportError(format!(
                    "invalid core address '{}:{}': {}",
                    config.host, config.port, e
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .no_proxy()
            .build()
            .map_err(|e| TransportError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<String, TransportError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError(format!("invalid request path '{}': {}", path, e)))?;

        let mut request = match method {
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await.map_err(|e| TransportError(e.to_string()))?;
        let status = response.status();
        tracing::debug!(method = %method, path = %path, status = %status, "Core responded");

        response
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))
    }
}
