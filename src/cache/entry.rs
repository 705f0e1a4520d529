//! Cache Entry Module
//!
//! A stored value together with the instant it was inserted.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry. Valid for reads while `age < lifetime`.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was inserted
    pub inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
        }
    }

    // == Age ==
    /// Time elapsed since insertion.
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `lifetime`.
    ///
    /// Boundary condition: an entry whose age equals the lifetime is expired.
    pub fn is_expired(&self, lifetime: Duration) -> bool {
        self.age() >= lifetime
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self, lifetime: Duration) -> Duration {
        lifetime.saturating_sub(self.age())
    }
}
