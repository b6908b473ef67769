//! Cache Module
//!
//! In-memory caching with TTL expiration, LRU eviction, stale-while-revalidate
//! and per-key load coalescing.

mod engine;
mod entry;
mod expiry;
mod inflight;
mod key;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use engine::{Cache, CleanupReport, EntryMetadata};
pub use entry::{CacheEntry, EntryOptions};
pub use expiry::Freshness;
pub use inflight::{InFlight, SharedLoad};
pub use key::{generate_key, KEY_DELIMITER};
pub use lru::LruTracker;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::EntryStore;
