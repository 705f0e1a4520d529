//! Response DTOs for the hosting surface
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::IdentityRecord;

/// Response body for GET /whoami
#[derive(Debug, Clone, Serialize)]
pub struct WhoAmIResponse {
    /// User the token belongs to
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl WhoAmIResponse {
    pub fn from_identity(identity: &IdentityRecord) -> Self {
        Self {
            username: identity.user().to_string(),
            name: identity.name().map(str::to_string),
        }
    }
}

/// Token cache figures reported by GET /status
#[derive(Debug, Clone, Serialize)]
pub struct TokenCacheStatus {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for TokenCacheStatus {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for GET /status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    /// Health status (e.g., "ok")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub token_cache: TokenCacheStatus,
}

impl StatusResponse {
    pub fn ok(stats: CacheStats) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            token_cache: stats.into(),
        }
    }
}
