//! Upstream Error Taxonomy
//!
//! Turns a failed upstream exchange (status + body, or no response at all)
//! into exactly one [`TypedError`]. Building never fails.

use serde_json::{Map, Value};

use crate::error::{ErrorKind, TypedError};

/// Status reported outward for every upstream failure.
pub const UPSTREAM_ERROR_STATUS: u16 = 400;

/// Status reported outward when a 2xx body could not be understood.
pub const MALFORMED_RESPONSE_STATUS: u16 = 502;

/// Member stripped from JSON error bodies on 401/403 responses.
pub const ERROR_DESCRIPTION_FIELD: &str = "error_description";

// == Upstream Failure ==
/// What came back from a failed upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    /// Upstream status, `None` when no response was received
    pub status: Option<u16>,
    /// Response body, or a synthetic description of the connection failure
    pub body: String,
}

impl UpstreamFailure {
    pub fn response(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: body.into(),
        }
    }

    pub fn connection_failed(detail: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            body: format!("connection failed: {detail}"),
        }
    }
}

// == Error Builder ==
/// Pluggable translation from an upstream failure to a [`TypedError`].
pub trait ErrorBuilder: Send + Sync + 'static {
    /// Builds the error for a failed call made on behalf of `source`.
    fn build(&self, failure: &UpstreamFailure, source: &str) -> TypedError;

    /// Builds the error for a 2xx response whose body could not be parsed.
    fn malformed(&self, detail: &str, source: &str) -> TypedError {
        let mut data = Map::new();
        data.insert("source".into(), Value::from(source));
        data.insert("detail".into(), Value::from(detail));
        TypedError::new(
            ErrorKind::MalformedResponse,
            MALFORMED_RESPONSE_STATUS,
            "malformedResponse",
            "Error",
            "Upstream returned a malformed success response",
            data,
        )
    }

    /// Builds the error for a request that was rejected before sending.
    fn invalid_request(&self, detail: &str, source: &str) -> TypedError {
        let mut data = Map::new();
        data.insert("source".into(), Value::from(source));
        data.insert("detail".into(), Value::from(detail));
        TypedError::new(
            ErrorKind::InvalidRequest,
            UPSTREAM_ERROR_STATUS,
            "invalidRequest",
            "Error",
            "Outbound request could not be built",
            data,
        )
    }
}

// == Upstream Error Builder ==
/// Default builder shared by every outbound client; only the message differs.
#[derive(Debug, Clone)]
pub struct UpstreamErrorBuilder {
    message: String,
}

impl UpstreamErrorBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ErrorBuilder for UpstreamErrorBuilder {
    fn build(&self, failure: &UpstreamFailure, source: &str) -> TypedError {
        let mut data = Map::new();
        data.insert("source".into(), Value::from(source));

        let kind = match failure.status {
            Some(status) => {
                data.insert("originalStatusCode".into(), Value::from(status));
                ErrorKind::UpstreamError
            }
            None => ErrorKind::ConnectionFailed,
        };

        match serde_json::from_str::<Value>(&failure.body) {
            Ok(mut json) => {
                if failure.status.is_some_and(is_redacted_status) {
                    redact(&mut json);
                }
                data.insert("originalResponseJSON".into(), json);
            }
            Err(_) => {
                data.insert(
                    "originalResponseText".into(),
                    Value::from(failure.body.as_str()),
                );
            }
        }

        TypedError::new(
            kind,
            UPSTREAM_ERROR_STATUS,
            "upstreamError",
            "Error",
            self.message.as_str(),
            data,
        )
    }
}

/// 401 and 403 bodies have echoed credentials in their description.
pub fn is_redacted_status(status: u16) -> bool {
    status == 401 || status == 403
}

fn redact(json: &mut Value) {
    if let Value::Object(members) = json {
        members.remove(ERROR_DESCRIPTION_FIELD);
    }
}
