//! Cache Store Module
//!
//! Bounded map with LRU eviction and a single lifetime shared by all entries.
//! Expiry is checked lazily on read; nothing runs in the background.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore<V> {
    entries: HashMap<String, CacheEntry<V>>,
    lru: LruTracker,
    stats: CacheStats,
    /// Maximum number of entries; always at least 1
    max_entries: usize,
    /// How long an entry stays readable after insertion
    lifetime: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` (clamped to 1) entries,
    /// each readable for `lifetime` after insertion.
    pub fn new(max_entries: usize, lifetime: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            lifetime,
        }
    }

    // == Put ==
    /// Inserts or overwrites `key`, restarting its lifetime.
    ///
    /// If the store then holds more than `max_entries`, expired entries are
    /// purged first; only if that is not enough are least recently used
    /// entries evicted until it is back at capacity.
    pub fn put(&mut self, key: String, value: V) {
        self.entries.insert(key.clone(), CacheEntry::new(value));
        self.lru.touch(&key);

        if self.entries.len() > self.max_entries {
            self.purge_expired();
        }

        while self.entries.len() > self.max_entries {
            let Some(victim) = self.lru.evict_oldest() else {
                break;
            };
            self.entries.remove(&victim);
            self.stats.record_eviction();
            debug!(entries = self.entries.len(), "Evicted least recently used entry");
        }

        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// A hit refreshes the key's recency. An expired entry is removed and
    /// counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(self.lifetime),
        };

        if expired {
            self.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| {
            debug!(
                ttl_remaining_ms = entry.ttl_remaining(self.lifetime).as_millis() as u64,
                "Cache hit"
            );
            entry.value.clone()
        })
    }

    // == Remove ==
    /// Removes `key`, returning whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Clear ==
    /// Removes every entry. Counters other than the entry count are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Purge Expired ==
    /// Physically removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let lifetime = self.lifetime;
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(lifetime))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }
}
