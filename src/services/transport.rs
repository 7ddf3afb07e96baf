use crate::services::translator::RestRequest;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// What came back from the backend, body fully read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .map(|s| s.to_string()),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("backend request timed out")]
    Timeout,
    #[error("could not reach backend: {0}")]
    Connect(String),
    #[error("invalid backend request: {0}")]
    InvalidRequest(String),
    #[error("failed to read backend response: {0}")]
    Body(String),
    #[error("backend request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFailure::Timeout
        } else if err.is_connect() {
            TransportFailure::Connect(err.to_string())
        } else if err.is_builder() {
            TransportFailure::InvalidRequest(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportFailure::Body(err.to_string())
        } else {
            TransportFailure::Other(err.to_string())
        }
    }
}

/// Sends exactly one request. No retries happen at this layer.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &RestRequest) -> Result<RawResponse, TransportFailure>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .build()
            .map_err(|err| TransportFailure::InvalidRequest(err.to_string()))?;
        Ok(Self { client, timeout })
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportFailure> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| TransportFailure::InvalidRequest(format!("invalid header name: {}", key)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| TransportFailure::InvalidRequest(format!("invalid value for header {}", key)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &RestRequest) -> Result<RawResponse, TransportFailure> {
        let mut req = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(header_map(&request.headers)?);
        if let Some(body) = &request.body {
            req = req.body(body.to_string());
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(|s| s.to_string()),
            body,
        })
    }
}
