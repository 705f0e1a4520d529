//! ORCID OAuth payloads.

use serde::{Deserialize, Serialize};

/// Token payload returned by the ORCID OAuth `/token` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrcidAuth {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub scope: String,
    pub name: String,
    pub orcid: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

impl OrcidAuth {
    /// The parts of the payload that are safe to show a user.
    pub fn public(&self) -> OrcidAuthPublic {
        OrcidAuthPublic {
            name: self.name.clone(),
            scope: self.scope.clone(),
            expires_in: self.expires_in,
            orcid: self.orcid.clone(),
        }
    }
}

/// [`OrcidAuth`] without any token material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrcidAuthPublic {
    pub name: String,
    pub scope: String,
    pub expires_in: u64,
    pub orcid: String,
}
