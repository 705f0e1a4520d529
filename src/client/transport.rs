//! Transport interface used by every outbound client.
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;

use super::RequestSpec;
use crate::error::ConstructionError;

/// Status and body text of an upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn empty(status: u16) -> Self {
        Self::new(status, String::new())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network-level failures: no usable response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connect(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request error: {0}")]
    Request(String),
    /// The request could not be built, so nothing was sent
    #[error("invalid request: {0}")]
    Builder(String),
}

impl TransportError {
    /// Whether a request may have reached the network.
    pub fn was_sent(&self) -> bool {
        !matches!(self, TransportError::Builder(_))
    }
}

/// Issues one request and hands back whatever the upstream answered.
///
/// No retries: a transport sends exactly one request per `send`.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn send(&self, request: &RequestSpec) -> Result<RawResponse, TransportError>;
}

/// Real network transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ConstructionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConstructionError::HttpClient(e.to_string()))?;
        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn backend_name(&self) -> &'static str {
        "reqwest"
    }

    async fn send(&self, request: &RequestSpec) -> Result<RawResponse, TransportError> {
        let mut builder = self.http.request(request.method.clone(), request.url());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            if request.header_value(CONTENT_TYPE.as_str()).is_none() {
                builder = builder.header(CONTENT_TYPE, body.content_type());
            }
            builder = builder.body(body.encode());
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        Ok(RawResponse { status, body })
    }
}

impl ReqwestTransport {
    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_builder() {
            TransportError::Builder(err.to_string())
        } else if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}
