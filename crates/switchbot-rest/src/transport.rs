//! HTTP transport abstraction
//!
//! The pipeline hands a fully signed [`HttpRequest`] to a [`Transport`] and
//! gets back the status and the complete body. The default implementation
//! uses `reqwest`; tests and callers may inject their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use tracing::debug;
use url::Url;

/// Outgoing request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: Url,
    /// Request headers (including the signed authentication headers)
    pub headers: HeaderMap,
    /// Encoded body
    pub body: Option<Vec<u8>>,
}

/// Response with the body fully read into memory
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with no headers
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Errors raised before any HTTP status is available
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client failed (connect, DNS, TLS, body read, client timeout)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The caller's deadline elapsed
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// Failure reported by a custom transport
    #[error("Transport failure: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Performs a single HTTP exchange
///
/// Implementations must be safe to share between tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and read the whole response body
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the given timeout and user agent
    ///
    /// Header names go out title-cased (`Authorization`, `T`, `Nonce`,
    /// `Sign`, `Content-Type`).
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .http1_title_case_headers()
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest::Client`
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        debug!(status, len = body.len(), "Received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
