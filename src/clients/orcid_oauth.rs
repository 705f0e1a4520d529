//! ORCID OAuth client
//!
//! Token exchange, refresh and revocation against `{oauth_base_url}`.

use std::sync::Arc;

use tracing::info;

use crate::client::{OutboundClient, RequestSpec, Transport};
use crate::error::{ConstructionError, TypedError};
use crate::models::OrcidAuth;
use crate::upstream::UpstreamErrorBuilder;

pub const ORCID_OAUTH_ERROR_MESSAGE: &str = "Error fetching data from ORCID Auth api";

/// ORCID OAuth client credentials plus endpoint.
#[derive(Debug, Clone, Default)]
pub struct OrcidOAuthParams {
    pub base_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Clone)]
pub struct OrcidOAuthClient {
    base_url: String,
    client_id: String,
    client_secret: String,
    client: OutboundClient,
}

impl OrcidOAuthClient {
    pub fn new(
        params: OrcidOAuthParams,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConstructionError> {
        let mut missing = Vec::new();
        let base_url = require(params.base_url, "base_url", &mut missing);
        let client_id = require(params.client_id, "client_id", &mut missing);
        let client_secret = require(params.client_secret, "client_secret", &mut missing);
        if !missing.is_empty() {
            return Err(ConstructionError::MissingParameters(missing));
        }

        let client = OutboundClient::new(
            transport,
            Arc::new(UpstreamErrorBuilder::new(ORCID_OAUTH_ERROR_MESSAGE)),
        );
        Ok(Self {
            base_url,
            client_id,
            client_secret,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn form_request(&self, path: &str) -> RequestSpec {
        RequestSpec::post(&self.base_url, path).header("Accept", "application/json")
    }

    // == Revoke ==
    /// Revokes the ORCID side of a link. Success has no body.
    pub async fn revoke_token(&self, access_token: &str) -> Result<(), TypedError> {
        let spec = self.form_request("revoke").form([
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("token", access_token),
        ]);
        self.client.call(&spec, "revoke_link").await?;
        info!("Revoked ORCID access token");
        Ok(())
    }

    // == Exchange Code ==
    /// Trades an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<OrcidAuth, TypedError> {
        let spec = self.form_request("token").form([
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ]);
        self.client.call_json(&spec, "exchange_code").await
    }

    // == Refresh ==
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<OrcidAuth, TypedError> {
        let spec = self.form_request("token").form([
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ]);
        self.client.call_json(&spec, "refresh_token").await
    }
}

fn require(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}
