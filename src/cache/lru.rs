//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Every touch stamps the key with a fresh, strictly increasing tick:
/// - Lowest tick = Least recently used
/// - Highest tick = Most recently used
///
/// New keys and touched keys both take a new tick, so ties between keys that
/// were never read fall back to insertion order.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Keys ordered by last access tick
    order: BTreeMap<u64, String>,
    /// Current tick of each tracked key
    ticks: HashMap<String, u64>,
    /// Next tick to hand out
    next_tick: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used, tracking it if it is new.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(current) => {
                let owned = self
                    .order
                    .remove(current)
                    .expect("lru tick map and order map out of sync");
                *current = tick;
                self.order.insert(tick, owned);
            }
            None => {
                self.ticks.insert(key.to_string(), tick);
                self.order.insert(tick, key.to_string());
            }
        }
    }

    // == Remove ==
    /// Removes a key from the tracker. Returns whether it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.ticks.remove(key) {
            Some(tick) => {
                let removed = self.order.remove(&tick);
                debug_assert!(removed.is_some(), "lru order missing tick for {key}");
                true
            }
            None => false,
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    /// Iterates keys from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.values()
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.order.clear();
        self.ticks.clear();
    }
}
