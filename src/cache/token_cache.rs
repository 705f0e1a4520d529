//! Token Cache
//!
//! Shared, bounded, time-expiring map from a token to its validated identity.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::models::IdentityRecord;

/// Thread-safe token cache. Clones share the same underlying store.
///
/// Two callers that miss on the same token at once may both validate it
/// upstream; the second `put` simply overwrites the first.
#[derive(Debug, Clone)]
pub struct TokenCache {
    inner: Arc<RwLock<CacheStore<IdentityRecord>>>,
}

impl TokenCache {
    pub fn new(max_size: usize, lifetime: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheStore::new(max_size, lifetime))),
        }
    }

    /// Cached record for `token`, absent if never stored or expired.
    pub async fn get(&self, token: &str) -> Option<IdentityRecord> {
        // Write lock: a hit updates recency and stats
        self.inner.write().await.get(token)
    }

    pub async fn put(&self, token: &str, record: IdentityRecord) {
        self.inner.write().await.put(token.to_string(), record);
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Drops expired entries now instead of waiting for them to be read.
    pub async fn purge_expired(&self) -> usize {
        self.inner.write().await.purge_expired()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    pub async fn max_size(&self) -> usize {
        self.inner.read().await.max_entries()
    }

    pub async fn lifetime(&self) -> Duration {
        self.inner.read().await.lifetime()
    }
}
