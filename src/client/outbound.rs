//! Outbound Client
//!
//! The shared call contract every upstream client goes through.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{RequestSpec, Transport};
use crate::error::TypedError;
use crate::upstream::{ErrorBuilder, UpstreamFailure};

// == Outbound Client ==
/// Calls a remote HTTP/JSON endpoint and normalizes every failure.
#[derive(Clone)]
pub struct OutboundClient {
    transport: Arc<dyn Transport>,
    errors: Arc<dyn ErrorBuilder>,
}

impl OutboundClient {
    pub fn new(transport: Arc<dyn Transport>, errors: Arc<dyn ErrorBuilder>) -> Self {
        Self { transport, errors }
    }

    /// The error builder, for clients that raise errors of their own.
    pub fn errors(&self) -> &dyn ErrorBuilder {
        self.errors.as_ref()
    }

    // == Call ==
    /// Issues one request.
    ///
    /// # Returns
    /// - `Ok(None)` for a 2xx response with an empty body
    /// - `Ok(Some(json))` for a 2xx response with a JSON body
    /// - `Err` with kind `MalformedResponse` for a 2xx body that is not JSON
    /// - `Err` built by the error builder for non-2xx or network failure
    pub async fn call(&self, spec: &RequestSpec, source: &str) -> Result<Option<Value>, TypedError> {
        debug!(
            source,
            method = %spec.method,
            url = %spec.url(),
            backend = self.transport.backend_name(),
            "Outbound call"
        );

        let response = match self.transport.send(spec).await {
            Ok(response) => response,
            Err(e) if !e.was_sent() => {
                warn!(source, error = %e, "Outbound request rejected before sending");
                return Err(self.errors.invalid_request(&e.to_string(), source));
            }
            Err(e) => {
                warn!(source, error = %e, "Upstream connection failed");
                return Err(self.errors.build(&UpstreamFailure::connection_failed(&e), source));
            }
        };

        if !response.is_success() {
            warn!(source, status = response.status, "Upstream returned error status");
            let failure = UpstreamFailure::response(response.status, response.body);
            return Err(self.errors.build(&failure, source));
        }

        if response.body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&response.body).map(Some).map_err(|e| {
            warn!(source, error = %e, "Upstream success body is not JSON");
            self.errors.malformed(&e.to_string(), source)
        })
    }

    /// Like [`call`](Self::call) but requires a body and decodes it into `T`.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        spec: &RequestSpec,
        source: &str,
    ) -> Result<T, TypedError> {
        let value = self
            .call(spec, source)
            .await?
            .ok_or_else(|| self.errors.malformed("empty response body", source))?;
        serde_json::from_value(value).map_err(|e| self.errors.malformed(&e.to_string(), source))
    }
}
