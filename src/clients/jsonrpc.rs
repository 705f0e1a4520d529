//! JSON-RPC 1.1 over the outbound client
//!
//! Envelope building and result unwrapping shared by the Service Wizard and
//! the dynamic services it locates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::client::{OutboundClient, RequestSpec, Transport};
use crate::error::TypedError;
use crate::upstream::{ErrorBuilder, UpstreamErrorBuilder, UpstreamFailure};

#[derive(Clone)]
pub struct JsonRpcClient {
    client: OutboundClient,
    token: Option<String>,
    next_id: Arc<AtomicU64>,
}

impl JsonRpcClient {
    pub fn new(transport: Arc<dyn Transport>, token: Option<String>, error_message: &str) -> Self {
        Self {
            client: OutboundClient::new(transport, Arc::new(UpstreamErrorBuilder::new(error_message))),
            token,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn errors(&self) -> &dyn ErrorBuilder {
        self.client.errors()
    }

    /// Calls `<module>.<method>` at `url` and decodes the first result element.
    ///
    /// An `error` member in a 2xx response goes through the error builder like
    /// any other upstream failure; a missing `result` is a malformed response.
    pub async fn call<T: DeserializeOwned>(
        &self,
        url: &str,
        module: &str,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TypedError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "version": "1.1",
            "id": id.to_string(),
            "method": format!("{module}.{method}"),
            "params": params,
        });

        let mut spec = RequestSpec::post(url, "").json(payload);
        if let Some(token) = &self.token {
            spec = spec.header("Authorization", token);
        }

        let response: Value = self.client.call_json(&spec, method).await?;

        if response.get("error").is_some_and(|e| !e.is_null()) {
            let failure = UpstreamFailure::response(200, response.to_string());
            return Err(self.errors().build(&failure, method));
        }

        let result = response
            .get("result")
            .and_then(|r| r.get(0))
            .cloned()
            .ok_or_else(|| self.errors().malformed("missing result", method))?;
        serde_json::from_value(result).map_err(|e| self.errors().malformed(&e.to_string(), method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RawResponse, RequestBody, StaticTransport};
    use crate::error::ErrorKind;
    use reqwest::Method;

    fn rpc(transport: &StaticTransport, token: Option<&str>) -> JsonRpcClient {
        JsonRpcClient::new(
            Arc::new(transport.clone()),
            token.map(str::to_string),
            "Error calling service",
        )
    }

    #[tokio::test]
    async fn test_envelope_and_ids() {
        let transport = StaticTransport::new().respond(
            Method::POST,
            "",
            RawResponse::json(200, &json!({"version": "1.1", "result": [42]})),
        );
        let client = rpc(&transport, Some("tok"));

        let first: u32 = client.call("http://svc", "Mod", "count", vec![json!({"a": 1})]).await.unwrap();
        let _: u32 = client.call("http://svc", "Mod", "count", Vec::new()).await.unwrap();

        assert_eq!(first, 42);
        let sent = transport.requests();
        assert_eq!(sent[0].header_value("authorization"), Some("tok"));
        let (Some(RequestBody::Json(a)), Some(RequestBody::Json(b))) = (&sent[0].body, &sent[1].body) else {
            panic!("expected JSON bodies");
        };
        assert_eq!(a["method"], "Mod.count");
        assert_eq!(a["params"][0]["a"], 1);
        assert_ne!(a["id"], b["id"]);
    }

    #[tokio::test]
    async fn test_missing_result_is_malformed() {
        let transport = StaticTransport::new().respond(
            Method::POST,
            "",
            RawResponse::json(200, &json!({"version": "1.1"})),
        );
        let err = rpc(&transport, None)
            .call::<Value>("http://svc", "Mod", "m", Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedResponse);
        assert_eq!(err.source(), Some("m"));
    }
}
