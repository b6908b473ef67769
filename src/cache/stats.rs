//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Monotonic cache counters. Only [`CacheStats::reset`] moves them back.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of reads served from the cache (fresh or stale)
    pub hits: u64,
    /// Number of reads that found nothing usable
    pub misses: u64,
    /// Entries removed by capacity eviction or by the expiry sweep
    pub evictions: u64,
    /// When the expiry sweep last ran
    pub last_cleanup: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Evictions ==
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Record Cleanup ==
    /// Records an expiry sweep that removed `count` entries.
    pub fn record_cleanup(&mut self, count: usize, at: DateTime<Utc>) {
        self.record_evictions(count);
        self.last_cleanup = Some(at);
    }

    // == Reset ==
    /// Zeroes every counter and forgets the last sweep time.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // == Snapshot ==
    /// Builds a read-only view combined with the store's current shape.
    pub fn snapshot(&self, keys: Vec<String>, max_entries: usize) -> StatsSnapshot {
        StatsSnapshot {
            size: keys.len(),
            keys,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            last_cleanup: self.last_cleanup,
            max_entries,
            hit_rate: self.hit_rate(),
        }
    }
}

// == Stats Snapshot ==
/// Point-in-time statistics exported to diagnostics consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Current number of entries
    pub size: usize,
    /// Live keys from least to most recently used
    pub keys: Vec<String>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub last_cleanup: Option<DateTime<Utc>>,
    pub max_entries: usize,
    pub hit_rate: f64,
}
