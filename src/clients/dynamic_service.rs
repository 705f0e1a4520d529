//! Dynamic service client
//!
//! JSON-RPC 1.1 calls to a service whose URL is handed out by the Service
//! Wizard. The URL is looked up on first use and reused from the wizard's
//! URL cache until it expires.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::clients::jsonrpc::JsonRpcClient;
use crate::clients::service_wizard::ServiceWizardClient;
use crate::error::{ConstructionError, TypedError};
use crate::models::ServiceVersion;

pub const DYNAMIC_SERVICE_ERROR_MESSAGE: &str = "Error calling dynamic service";

#[derive(Clone)]
pub struct DynamicServiceClient {
    wizard: ServiceWizardClient,
    module: String,
    version: Option<ServiceVersion>,
    rpc: JsonRpcClient,
}

impl DynamicServiceClient {
    /// Client for `module`, located through `wizard` and sharing its
    /// transport, token and URL cache.
    pub fn new(
        wizard: ServiceWizardClient,
        module: impl Into<String>,
        version: Option<ServiceVersion>,
    ) -> Result<Self, ConstructionError> {
        let module = module.into();
        if module.trim().is_empty() {
            return Err(ConstructionError::MissingParameters(vec!["module"]));
        }
        let rpc = JsonRpcClient::new(wizard.transport(), wizard.token(), DYNAMIC_SERVICE_ERROR_MESSAGE);
        Ok(Self {
            wizard,
            module,
            version,
            rpc,
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Calls `<module>.<method>` at the module's current URL.
    pub async fn call_func<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TypedError> {
        let url = self.wizard.resolve_url(&self.module, self.version).await?;
        debug!(module = %self.module, method, url = %url, "Calling dynamic service");
        self.rpc.call(&url, &self.module, method, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{RawResponse, RequestBody, StaticTransport};
    use crate::error::ErrorKind;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;

    const WIZARD_URL: &str = "http://127.0.0.1:9999/services/service_wizard";
    const MODULE_URL: &str = "https://ci.kbase.us:443/dynserv/abc.ORCIDLink";

    fn transport() -> StaticTransport {
        StaticTransport::new().route(Method::POST, "", |req| {
            let Some(RequestBody::Json(body)) = &req.body else {
                return Ok(RawResponse::new(400, "no body"));
            };
            let response = match body["method"].as_str() {
                Some("ServiceWizard.get_service_status") => json!({
                    "version": "1.1",
                    "result": [{"module_name": "ORCIDLink", "url": MODULE_URL}]
                }),
                Some("ORCIDLink.get_link") => json!({
                    "version": "1.1",
                    "result": [{"username": body["params"][0]["username"], "orcid": "0000-0003-4997-3076"}]
                }),
                _ => json!({
                    "version": "1.1",
                    "error": {"name": "JSONRPCError", "code": -32601, "message": "Method not found"}
                }),
            };
            Ok(RawResponse::json(200, &response))
        })
    }

    fn client(transport: &StaticTransport) -> DynamicServiceClient {
        let wizard = ServiceWizardClient::new(
            Some(WIZARD_URL.into()),
            Some("token".into()),
            Arc::new(transport.clone()),
        )
        .unwrap();
        DynamicServiceClient::new(wizard, "ORCIDLink", Some(ServiceVersion::Release)).unwrap()
    }

    fn wizard_calls(transport: &StaticTransport) -> usize {
        transport
            .requests()
            .iter()
            .filter(|r| r.base_url == WIZARD_URL)
            .count()
    }

    #[test]
    fn test_module_is_required() {
        let wizard = ServiceWizardClient::new(
            Some(WIZARD_URL.into()),
            None,
            Arc::new(StaticTransport::new()),
        )
        .unwrap();
        let result = DynamicServiceClient::new(wizard, "", None);
        assert!(matches!(result, Err(ConstructionError::MissingParameters(_))));
    }

    #[tokio::test]
    async fn test_two_calls_cost_one_lookup() {
        let transport = transport();
        let client = client(&transport);

        for _ in 0..2 {
            let link: Value = client
                .call_func("get_link", vec![json!({"username": "foo"})])
                .await
                .unwrap();
            assert_eq!(link["username"], "foo");
        }

        assert_eq!(wizard_calls(&transport), 1);
        let service_calls: Vec<_> = transport
            .requests()
            .into_iter()
            .filter(|r| r.base_url == MODULE_URL)
            .collect();
        assert_eq!(service_calls.len(), 2);
        assert_eq!(service_calls[0].header_value("authorization"), Some("token"));
        let Some(RequestBody::Json(sent)) = &service_calls[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(sent["method"], "ORCIDLink.get_link");
        assert_eq!(sent["version"], "1.1");
    }

    #[tokio::test]
    async fn test_rpc_error_from_service() {
        let err = client(&transport())
            .call_func::<Value>("nope", Vec::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.message, DYNAMIC_SERVICE_ERROR_MESSAGE);
        assert_eq!(err.source(), Some("nope"));
        assert_eq!(err.original_json().unwrap()["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_lookup_failure_stops_before_service_call() {
        let transport = StaticTransport::new().respond(
            Method::POST,
            "",
            RawResponse::new(503, "Service Unavailable"),
        );
        let err = client(&transport)
            .call_func::<Value>("get_link", Vec::new())
            .await
            .unwrap_err();

        assert_eq!(err.source(), Some("get_service_status"));
        assert_eq!(transport.call_count(), 1);
    }
}
