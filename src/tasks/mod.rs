//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Expiry sweep: removes dead cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
