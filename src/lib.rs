//! Coalesce Cache - An in-process cache for remote reads
//!
//! Provides TTL expiration, LRU eviction, stale-while-revalidate and
//! deduplication of concurrent loads, plus an HTTP diagnostics surface.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{generate_key, Cache, EntryOptions};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
