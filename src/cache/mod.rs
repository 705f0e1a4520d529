//! Cache Module
//!
//! In-memory caching with lifetime expiry and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;
mod token_cache;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use token_cache::TokenCache;
