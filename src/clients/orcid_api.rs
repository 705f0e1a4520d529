//! ORCID API client
//!
//! Record, email and works calls scoped to one ORCID iD. Payloads are kept as
//! raw JSON; the ORCID record is too large to model usefully here.

use std::sync::Arc;

use serde_json::Value;

use crate::client::{OutboundClient, RequestSpec, Transport};
use crate::error::{ConstructionError, TypedError};
use crate::upstream::UpstreamErrorBuilder;

pub const ORCID_API_ERROR_MESSAGE: &str = "Error fetching data from ORCID api";

pub const ORCID_CONTENT_TYPE: &str = "application/vnd.orcid+json";

#[derive(Clone)]
pub struct OrcidApiClient {
    base_url: String,
    access_token: String,
    client: OutboundClient,
}

impl OrcidApiClient {
    pub fn new(
        base_url: Option<String>,
        access_token: Option<String>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConstructionError> {
        let (base_url, access_token) = match (base_url, access_token) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => (url, token),
            (url, token) => {
                let mut missing = Vec::new();
                if url.map_or(true, |u| u.is_empty()) {
                    missing.push("base_url");
                }
                if token.map_or(true, |t| t.is_empty()) {
                    missing.push("access_token");
                }
                return Err(ConstructionError::MissingParameters(missing));
            }
        };

        let client = OutboundClient::new(
            transport,
            Arc::new(UpstreamErrorBuilder::new(ORCID_API_ERROR_MESSAGE)),
        );
        Ok(Self {
            base_url,
            access_token,
            client,
        })
    }

    /// Headers sent with every ORCID API call.
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Accept".into(), ORCID_CONTENT_TYPE.into()),
            ("Content-Type".into(), ORCID_CONTENT_TYPE.into()),
            ("Authorization".into(), format!("Bearer {}", self.access_token)),
        ]
    }

    fn request(&self, spec: RequestSpec) -> RequestSpec {
        self.headers()
            .into_iter()
            .fold(spec, |spec, (name, value)| spec.header(name, value))
    }

    async fn fetch(&self, spec: RequestSpec, source: &str) -> Result<Value, TypedError> {
        self.client.call_json(&self.request(spec), source).await
    }

    // == Profile ==
    pub async fn get_profile(&self, orcid_id: &str) -> Result<Value, TypedError> {
        let spec = RequestSpec::get(&self.base_url, format!("{orcid_id}/record"));
        self.fetch(spec, "get_profile").await
    }

    pub async fn get_email(&self, orcid_id: &str) -> Result<Value, TypedError> {
        let spec = RequestSpec::get(&self.base_url, format!("{orcid_id}/email"));
        self.fetch(spec, "get_email").await
    }

    // == Works ==
    pub async fn get_works(&self, orcid_id: &str) -> Result<Value, TypedError> {
        let spec = RequestSpec::get(&self.base_url, format!("{orcid_id}/works"));
        self.fetch(spec, "get_works").await
    }

    /// Fetches one work by its put code.
    pub async fn get_work(&self, orcid_id: &str, put_code: &str) -> Result<Value, TypedError> {
        let spec = RequestSpec::get(&self.base_url, format!("{orcid_id}/work/{put_code}"));
        self.fetch(spec, "get_work").await
    }

    pub async fn save_work(
        &self,
        orcid_id: &str,
        put_code: &str,
        work_record: Value,
    ) -> Result<Value, TypedError> {
        let spec =
            RequestSpec::put(&self.base_url, format!("{orcid_id}/work/{put_code}")).json(work_record);
        self.fetch(spec, "save_work").await
    }

    /// Creates works from a `{"bulk": [{"work": ...}]}` payload.
    pub async fn create_works(&self, orcid_id: &str, bulk: Value) -> Result<Value, TypedError> {
        let spec = RequestSpec::post(&self.base_url, format!("{orcid_id}/works")).json(bulk);
        self.fetch(spec, "create_works").await
    }

    pub async fn delete_work(&self, orcid_id: &str, put_code: &str) -> Result<(), TypedError> {
        let spec = RequestSpec::new(
            reqwest::Method::DELETE,
            &self.base_url,
            format!("{orcid_id}/work/{put_code}"),
        );
        self.client.call(&self.request(spec), "delete_work").await?;
        Ok(())
    }
}
