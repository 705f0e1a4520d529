//! Error types for the linking service's auth layer
//!
//! Every outbound client reports failures as a [`TypedError`]; the token
//! validator wraps those in [`AuthError`] so callers handle one contract.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

// == Error Kind ==
/// Classifies how an outbound call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Upstream answered with a non-success status
    UpstreamError,
    /// Upstream could not be reached (refused, reset, timed out)
    ConnectionFailed,
    /// Upstream answered 2xx but the body was not the expected JSON
    MalformedResponse,
    /// The identity service rejected the token
    InvalidToken,
    /// The outbound request could not be built; nothing was sent
    InvalidRequest,
}

// == Typed Error ==
/// A single normalized failure, independent of which upstream produced it.
///
/// `http_status` is the status reported to *our* caller. The upstream's own
/// status, when there was one, lives in `data.originalStatusCode`.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct TypedError {
    #[serde(skip)]
    pub kind: ErrorKind,
    #[serde(skip)]
    pub http_status: u16,
    pub code: String,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl TypedError {
    pub fn new(
        kind: ErrorKind,
        http_status: u16,
        code: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            kind,
            http_status,
            code: code.into(),
            title: title.into(),
            message: message.into(),
            data,
        }
    }

    /// The operation label recorded when the error was built.
    pub fn source(&self) -> Option<&str> {
        self.data.get("source").and_then(Value::as_str)
    }

    /// The upstream status code, absent for connection failures.
    pub fn original_status(&self) -> Option<u16> {
        self.data
            .get("originalStatusCode")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
    }

    /// Parsed upstream error body, if it was JSON.
    pub fn original_json(&self) -> Option<&Value> {
        self.data.get("originalResponseJSON")
    }

    /// Raw upstream error body, if it was not JSON.
    pub fn original_text(&self) -> Option<&str> {
        self.data.get("originalResponseText").and_then(Value::as_str)
    }
}

// == Construction Error ==
/// Raised when a client or validator is built without what it needs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("missing required parameter(s): {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

// == Auth Error ==
/// The three outcomes a token validation can fail with.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token does not validate
    #[error("invalid token: {0}")]
    InvalidToken(TypedError),

    /// Identity service unreachable, malformed, or returned an unrecognized error
    #[error("upstream failure: {0}")]
    Upstream(TypedError),

    /// Required configuration was missing at construction
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

impl AuthError {
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, AuthError::InvalidToken(_))
    }

    pub fn typed(&self) -> Option<&TypedError> {
        match self {
            AuthError::InvalidToken(err) | AuthError::Upstream(err) => Some(err),
            AuthError::Construction(_) => None,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for TypedError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidToken(mut err) => {
                err.http_status = StatusCode::UNAUTHORIZED.as_u16();
                err.into_response()
            }
            AuthError::Upstream(err) => err.into_response(),
            AuthError::Construction(err) => {
                let body = TypedError::new(
                    ErrorKind::UpstreamError,
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    "configurationError",
                    "Configuration Error",
                    err.to_string(),
                    Map::new(),
                );
                body.into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for token validation.
pub type Result<T> = std::result::Result<T, AuthError>;
