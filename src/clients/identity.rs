//! Identity service client
//!
//! Fetches the token record for a bearer token and sorts failures into
//! "the token is bad" versus "the identity service misbehaved".

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{OutboundClient, RequestSpec, Transport};
use crate::error::{AuthError, ConstructionError, ErrorKind, TypedError};
use crate::models::IdentityRecord;
use crate::token_fingerprint;
use crate::upstream::UpstreamErrorBuilder;

pub const IDENTITY_ERROR_MESSAGE: &str = "Error fetching data from KBase Auth";

/// Label recorded as `data.source` on identity-service failures.
pub const GET_TOKEN_SOURCE: &str = "get_token";

/// Application code for "No authentication token".
pub const NO_TOKEN_APPCODE: i64 = 10010;

/// Application code for "Invalid Token".
pub const INVALID_TOKEN_APPCODE: i64 = 10020;

// == Identity Client ==
#[derive(Clone)]
pub struct IdentityClient {
    url: String,
    client: OutboundClient,
}

impl IdentityClient {
    pub fn new(
        url: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConstructionError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ConstructionError::MissingParameters(vec!["auth_url"]));
        }
        let client = OutboundClient::new(
            transport,
            Arc::new(UpstreamErrorBuilder::new(IDENTITY_ERROR_MESSAGE)),
        );
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    // == Fetch Identity ==
    /// `GET {url}` with `Authorization: <token>`.
    pub async fn fetch_identity(&self, token: &str) -> Result<IdentityRecord, AuthError> {
        let spec = RequestSpec::get(&self.url, "")
            .header("Authorization", token)
            .header("Accept", "application/json");

        let record: IdentityRecord = self
            .client
            .call_json(&spec, GET_TOKEN_SOURCE)
            .await
            .map_err(|err| classify(err, token))?;

        debug!(token = %token_fingerprint(token), user = record.user(), "Token validated upstream");
        Ok(record)
    }
}

/// The identity service's application error code, if the body carried one.
pub fn app_code(err: &TypedError) -> Option<i64> {
    err.original_json()?.get("error")?.get("appcode")?.as_i64()
}

fn upstream_message(err: &TypedError) -> Option<&str> {
    err.original_json()?.get("error")?.get("message")?.as_str()
}

// == Classification ==
/// Only "Invalid Token" becomes [`AuthError::InvalidToken`]; everything else,
/// including "No authentication token", is an upstream failure.
fn classify(err: TypedError, token: &str) -> AuthError {
    match app_code(&err) {
        Some(INVALID_TOKEN_APPCODE) => {
            debug!(token = %token_fingerprint(token), "Identity service rejected token");
            let message = upstream_message(&err).unwrap_or("Invalid token").to_string();
            let mut data = err.data;
            data.insert("appcode".into(), Value::from(INVALID_TOKEN_APPCODE));
            AuthError::InvalidToken(TypedError::new(
                ErrorKind::InvalidToken,
                401,
                "invalidToken",
                "Invalid Token",
                message,
                data,
            ))
        }
        code => {
            warn!(
                token = %token_fingerprint(token),
                kind = ?err.kind,
                appcode = ?code,
                "Identity service call failed"
            );
            AuthError::Upstream(err)
        }
    }
}
