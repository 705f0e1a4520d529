//! Service-discovery payloads.

use serde::{Deserialize, Serialize};

/// Release channel a dynamic service is looked up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceVersion {
    Dev,
    Beta,
    Release,
}

/// Status record for one dynamic service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub module_name: String,
    pub url: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub git_commit_hash: Option<String>,
    #[serde(default)]
    pub release_tags: Vec<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub health: Option<String>,
    #[serde(default)]
    pub up: Option<i64>,
}
