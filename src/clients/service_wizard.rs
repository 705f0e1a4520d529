//! Service-discovery client
//!
//! JSON-RPC 1.1 calls to the Service Wizard, which knows where each dynamic
//! service currently lives. Discovered URLs are cached for a while so a
//! lookup is not paid on every call.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::cache::CacheStore;
use crate::client::Transport;
use crate::clients::jsonrpc::JsonRpcClient;
use crate::error::{ConstructionError, TypedError};
use crate::models::{ServiceStatus, ServiceVersion};

pub const SERVICE_WIZARD_ERROR_MESSAGE: &str = "Error calling the Service Wizard";

pub const SERVICE_WIZARD_MODULE: &str = "ServiceWizard";

/// How long a discovered service URL is reused.
pub const DEFAULT_URL_CACHE_LIFETIME: Duration = Duration::from_secs(300);

const URL_CACHE_SIZE: usize = 100;

#[derive(Clone)]
pub struct ServiceWizardClient {
    url: String,
    token: Option<String>,
    transport: Arc<dyn Transport>,
    rpc: JsonRpcClient,
    urls: Arc<Mutex<CacheStore<String>>>,
}

impl ServiceWizardClient {
    pub fn new(
        url: Option<String>,
        token: Option<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConstructionError> {
        let url = url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ConstructionError::MissingParameters(vec!["url"]))?;
        let rpc = JsonRpcClient::new(transport.clone(), token.clone(), SERVICE_WIZARD_ERROR_MESSAGE);
        Ok(Self {
            url,
            token,
            transport,
            rpc,
            urls: Arc::new(Mutex::new(CacheStore::new(
                URL_CACHE_SIZE,
                DEFAULT_URL_CACHE_LIFETIME,
            ))),
        })
    }

    /// Replaces the URL cache with one using `lifetime`.
    pub fn with_url_cache_lifetime(mut self, lifetime: Duration) -> Self {
        self.urls = Arc::new(Mutex::new(CacheStore::new(URL_CACHE_SIZE, lifetime)));
        self
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.token.clone()
    }

    // == JSON-RPC ==
    /// Calls `ServiceWizard.<method>` and decodes the first result element.
    pub async fn call_func<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TypedError> {
        self.rpc.call(&self.url, SERVICE_WIZARD_MODULE, method, params).await
    }

    // == Service Status ==
    pub async fn get_service_status(
        &self,
        module_name: &str,
        version: Option<ServiceVersion>,
    ) -> Result<ServiceStatus, TypedError> {
        let params = json!({
            "module_name": module_name,
            "version": version,
        });
        self.call_func("get_service_status", vec![params]).await
    }

    /// The Service Wizard's own status record.
    pub async fn status(&self) -> Result<Value, TypedError> {
        self.call_func("status", Vec::new()).await
    }

    // == Resolve URL ==
    /// Current URL of `module_name`, from cache when fresh.
    pub async fn resolve_url(
        &self,
        module_name: &str,
        version: Option<ServiceVersion>,
    ) -> Result<String, TypedError> {
        let key = cache_key(module_name, version);
        let cached = self.lock_urls().get(&key);
        if let Some(url) = cached {
            debug!(module = module_name, "Service URL cache hit");
            return Ok(url);
        }

        let status = self.get_service_status(module_name, version).await?;
        self.lock_urls().put(key, status.url.clone());
        debug!(module = module_name, url = %status.url, "Service URL discovered");
        Ok(status.url)
    }

    fn lock_urls(&self) -> std::sync::MutexGuard<'_, CacheStore<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn cache_key(module_name: &str, version: Option<ServiceVersion>) -> String {
    match version {
        Some(v) => format!("{module_name}:{v:?}"),
        None => module_name.to_string(),
    }
}
