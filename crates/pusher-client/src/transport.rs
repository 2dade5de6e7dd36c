//! Outbound HTTP transport.
//!
//! The facade hands a fully-formed request to a [`Transport`] exactly once per
//! call. Retries, timeouts and cancellation are the transport's business;
//! [`ReqwestTransport`] is the default implementation.

use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ClientError;

/// Default request timeout for [`ReqwestTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully-formed outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including the signed query string.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Serialized body, if any.
    pub body: Option<String>,
}

/// The status and raw body returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Raw response body.
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Serialization`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Capability to send one HTTP request.
///
/// Implementations return `Ok` for every response the service produced,
/// whatever its status; `Err` is reserved for requests that got no response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the service's answer.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ClientError>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Request`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create a transport with [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// See [`ReqwestTransport::new`].
    pub fn with_default_timeout() -> Result<Self, ClientError> {
        Self::new(DEFAULT_TIMEOUT)
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, ClientError> {
        debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!(%status, "Received response");

        Ok(TransportResponse { status, body })
    }
}
