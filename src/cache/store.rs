//! Entry Store Module
//!
//! Bounded key/entry storage combining a HashMap with LRU tracking.
//! The store knows nothing about hit/miss accounting; callers decide what a
//! lookup means and report evictions to the stats.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::{CacheEntry, Freshness, LruTracker};

// == Entry Store ==
/// Cache storage with an LRU capacity bound.
#[derive(Debug)]
pub struct EntryStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Maximum number of entries allowed; `0` disables storage
    max_entries: usize,
}

impl<V> EntryStore<V> {
    // == Constructor ==
    /// Creates a new store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            max_entries,
        }
    }

    // == Get ==
    /// Looks up an entry without touching its recency or freshness.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Set ==
    /// Inserts or overwrites an entry and marks it most recently used.
    ///
    /// Overwriting an existing key never evicts. Inserting a new key may
    /// leave the store over capacity until [`Self::evict_if_over_capacity`]
    /// runs. With a capacity of zero this is a no-op.
    pub fn set(&mut self, key: &str, value: V, ttl: Duration, stale_while_revalidate: Duration) {
        if self.max_entries == 0 {
            return;
        }

        let entry = CacheEntry::new(value, ttl, stale_while_revalidate);
        match self.entries.get_mut(key) {
            Some(existing) => *existing = entry,
            None => {
                self.entries.insert(key.to_string(), entry);
            }
        }
        self.lru.touch(key);
    }

    // == Delete ==
    /// Removes an entry. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            let tracked = self.lru.remove(key);
            debug_assert!(tracked, "entry {key} was not tracked by the lru");
            true
        } else {
            false
        }
    }

    // == Touch ==
    /// Marks an existing key as most recently used.
    pub fn touch(&mut self, key: &str) {
        if self.entries.contains_key(key) {
            self.lru.touch(key);
        }
    }

    // == Evict ==
    /// Evicts least recently used entries until the store fits its capacity.
    ///
    /// Returns the number of entries evicted.
    pub fn evict_if_over_capacity(&mut self) -> usize {
        let mut evicted = 0;
        while self.entries.len() > self.max_entries {
            let Some(key) = self.lru.evict_oldest() else {
                unreachable!("store holds {} entries but lru is empty", self.entries.len());
            };
            let removed = self.entries.remove(&key);
            assert!(removed.is_some(), "lru evicted untracked key {key}");
            debug!(key = %key, "evicted least recently used entry");
            evicted += 1;
        }
        evicted
    }

    // == Sweep ==
    /// Removes every entry that is dead at `now`. Returns the removed count.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let dead: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.freshness(now) == Freshness::Dead)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &dead {
            self.delete(key);
        }
        dead.len()
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    // == Capacity ==
    /// Returns the configured capacity.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Changes the capacity. Callers evict afterwards.
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
    }

    // == Keys ==
    /// Live keys from least to most recently used.
    pub fn keys(&self) -> Vec<String> {
        self.lru.iter().cloned().collect()
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry<V>)> {
        self.lru.iter().map(|key| {
            let entry = self
                .entries
                .get(key)
                .expect("lru tracks a key missing from the store");
            (key, entry)
        })
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    fn store_with(max_entries: usize, keys: &[&str]) -> EntryStore<String> {
        let mut store = EntryStore::new(max_entries);
        for key in keys {
            store.set(key, format!("value_{key}"), TTL, Duration::ZERO);
        }
        store
    }

    #[test]
    fn test_store_new() {
        let store: EntryStore<String> = EntryStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.max_entries(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let store = store_with(100, &["key1"]);

        let entry = store.get("key1").unwrap();
        assert_eq!(entry.value, "value_key1");
        assert_eq!(entry.ttl, TTL);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete() {
        let mut store = store_with(100, &["key1"]);

        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
    }

    #[test]
    fn test_store_overwrite_refreshes_metadata() {
        let mut store = store_with(100, &["key1"]);

        store.set("key1", "value2".to_string(), Duration::from_secs(5), Duration::from_secs(1));

        let entry = store.get("key1").unwrap();
        assert_eq!(entry.value, "value2");
        assert_eq!(entry.ttl, Duration::from_secs(5));
        assert_eq!(entry.stale_while_revalidate, Duration::from_secs(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = store_with(3, &["key1", "key2", "key3"]);

        store.set("key1", "again".to_string(), TTL, Duration::ZERO);

        assert_eq!(store.evict_if_over_capacity(), 0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = store_with(3, &["key1", "key2", "key3", "key4"]);

        assert_eq!(store.evict_if_over_capacity(), 1);
        assert_eq!(store.len(), 3);
        assert!(store.get("key1").is_none());
        assert!(store.get("key4").is_some());
    }

    #[test]
    fn test_store_touch_protects_from_eviction() {
        let mut store = store_with(3, &["key1", "key2", "key3"]);

        store.touch("key1");
        store.set("key4", "value4".to_string(), TTL, Duration::ZERO);
        store.evict_if_over_capacity();

        assert!(store.get("key1").is_some());
        assert!(store.get("key2").is_none());
        assert_eq!(store.keys(), ["key3", "key1", "key4"]);
    }

    #[test]
    fn test_store_touch_missing_key_is_ignored() {
        let mut store = store_with(3, &["key1"]);
        store.touch("ghost");
        assert_eq!(store.keys(), ["key1"]);
    }

    #[test]
    fn test_store_shrinking_capacity() {
        let mut store = store_with(5, &["a", "b", "c", "d", "e"]);

        store.set_max_entries(2);
        assert_eq!(store.evict_if_over_capacity(), 3);
        assert_eq!(store.keys(), ["d", "e"]);
    }

    #[test]
    fn test_store_zero_capacity_is_noop() {
        let mut store = store_with(0, &["key1"]);

        assert!(store.is_empty());
        assert!(store.get("key1").is_none());
        assert_eq!(store.evict_if_over_capacity(), 0);
    }

    #[test]
    fn test_store_sweep_removes_dead_entries() {
        let mut store: EntryStore<u32> = EntryStore::new(10);
        store.set("short", 1, Duration::from_millis(10), Duration::ZERO);
        store.set("stale", 2, Duration::from_millis(10), Duration::from_secs(60));
        store.set("long", 3, TTL, Duration::ZERO);

        let later = Instant::now() + Duration::from_secs(1);
        assert_eq!(store.sweep(later), 1);
        assert_eq!(store.len(), 2);
        assert!(store.get("short").is_none());
        assert!(store.get("stale").is_some());
        assert!(store.get("long").is_some());
    }

    #[test]
    fn test_store_clear() {
        let mut store = store_with(10, &["a", "b"]);
        store.clear();
        assert!(store.is_empty());
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_store_iter_follows_recency() {
        let mut store = store_with(10, &["a", "b", "c"]);
        store.touch("a");

        let keys: Vec<&String> = store.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["b", "c", "a"]);
    }
}
