//! Cache Engine Module
//!
//! The public cache handle. Composes the entry store, expiry policy, in-flight
//! coordinator and counters into `get`/`set`/`wrap` and friends.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::cache::{CacheStats, EntryOptions, EntryStore, Freshness, InFlight, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Reports ==
/// Outcome of an expiry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Dead entries removed by this sweep
    pub cleaned: usize,
    /// Running eviction total after the sweep
    pub evictions: u64,
}

/// Lightweight per-entry diagnostics. Never includes the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub key: String,
    /// Wall-clock time the entry was stored
    pub timestamp: DateTime<Utc>,
    /// TTL in milliseconds
    pub ttl: u64,
    /// Stale window in milliseconds
    pub stale_while_revalidate: u64,
    /// Type name of the cached payload
    pub value_type: &'static str,
    /// Whether the TTL has elapsed
    pub expired: bool,
    pub state: Freshness,
}

enum Lookup<V> {
    Fresh(V),
    Stale {
        value: V,
        ttl: Duration,
        stale_while_revalidate: Duration,
    },
    Miss,
}

struct State<V> {
    store: EntryStore<V>,
    stats: CacheStats,
}

impl<V: Clone> State<V> {
    /// Reads `key` for a caller, updating recency and counters.
    fn lookup(&mut self, key: &str, now: Instant) -> Lookup<V> {
        let Some(entry) = self.store.get(key) else {
            self.stats.record_miss();
            trace!(key = %key, "cache miss");
            return Lookup::Miss;
        };

        let freshness = entry.freshness(now);
        if !freshness.is_usable() {
            self.store.delete(key);
            self.stats.record_miss();
            trace!(key = %key, "cache miss (expired)");
            return Lookup::Miss;
        }

        let value = entry.value.clone();
        let found = if freshness.should_revalidate_in_background() {
            Lookup::Stale {
                value,
                ttl: entry.ttl,
                stale_while_revalidate: entry.stale_while_revalidate,
            }
        } else {
            Lookup::Fresh(value)
        };

        self.store.touch(key);
        self.stats.record_hit();
        trace!(key = %key, "cache hit");
        found
    }
}

struct Inner<V> {
    state: Mutex<State<V>>,
    in_flight: InFlight<V>,
    config: CacheConfig,
}

impl<V: Clone + Send + Sync + 'static> Inner<V> {
    fn write(&self, key: &str, value: V, ttl: Duration, stale_while_revalidate: Duration) {
        let mut state = self.state.lock();
        state.store.set(key, value, ttl, stale_while_revalidate);
        let evicted = state.store.evict_if_over_capacity();
        if evicted > 0 {
            state.stats.record_evictions(evicted);
            debug!(evicted, "cache over capacity");
        }
    }
}

// == Cache ==
/// A bounded in-memory cache with TTL, stale-while-revalidate and per-key
/// load coalescing.
///
/// `Cache` is a cheap handle; clones share the same state. Construct one per
/// process and hand clones to every consumer.
pub struct Cache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    store: EntryStore::new(config.max_entries),
                    stats: CacheStats::new(),
                }),
                in_flight: InFlight::new(),
                config,
            }),
        }
    }

    /// Creates an empty cache configured from the environment.
    pub fn from_env() -> Self {
        Self::new(CacheConfig::from_env())
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    // == Get ==
    /// Returns the cached value for `key` if it is fresh or stale.
    ///
    /// Dead entries are removed and count as a miss. Stale values are
    /// returned as-is; only [`Cache::wrap`] revalidates.
    pub fn get(&self, key: &str) -> Option<V> {
        match self.inner.state.lock().lookup(key, Instant::now()) {
            Lookup::Fresh(value) | Lookup::Stale { value, .. } => Some(value),
            Lookup::Miss => None,
        }
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// `options` is either a bare [`Duration`] (TTL with no stale window) or
    /// an [`EntryOptions`]; unset fields use the configured defaults.
    pub fn set(&self, key: &str, value: V, options: impl Into<EntryOptions>) {
        let config = &self.inner.config;
        let (ttl, stale_while_revalidate) = options
            .into()
            .resolve(config.default_ttl, config.default_stale_window);
        self.inner.write(key, value, ttl, stale_while_revalidate);
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.state.lock().store.delete(key)
    }

    // == Clear ==
    /// Empties the cache and resets all counters.
    ///
    /// Pending loads are not cancelled; their results land in the emptied
    /// cache when they complete.
    pub fn clear(&self) {
        let mut state = self.inner.state.lock();
        state.store.clear();
        state.stats.reset();
        info!("cache cleared");
    }

    // == Wrap ==
    /// Returns the cached value for `key`, loading it with `loader` when
    /// needed.
    ///
    /// - Fresh: returned directly.
    /// - Stale: returned directly while a single background reload runs. The
    ///   reloaded value keeps the entry's original TTL and stale window
    ///   unless `options` sets them explicitly. Reload failures are logged
    ///   and dropped.
    /// - Missing or dead: `loader` runs and its value is stored with
    ///   `options` (or the configured defaults) before being returned.
    ///   Loader errors are returned as [`CacheError::Loader`] and nothing is
    ///   cached.
    ///
    /// Concurrent calls for the same key share one loader invocation and
    /// all observe the same value or error. The load runs on its own task:
    /// dropping this future (a timeout, a disconnected client) does not stop
    /// it, and its value is still cached. A panicking loader is reported as
    /// [`CacheError::Loader`].
    ///
    /// A background reload that started before a later `set` or `delete`
    /// of the same key still writes its result when it completes; the last
    /// writer wins.
    ///
    /// Must be awaited within a tokio runtime.
    pub async fn wrap<F, Fut, E>(&self, key: &str, options: EntryOptions, loader: F) -> Result<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = std::result::Result<V, E>> + Send + 'static,
        E: Into<anyhow::Error> + Send + 'static,
    {
        let found = self.inner.state.lock().lookup(key, Instant::now());

        let (ttl, stale_while_revalidate) = match found {
            Lookup::Fresh(value) => return Ok(value),
            Lookup::Stale {
                value,
                ttl,
                stale_while_revalidate,
            } => {
                let (ttl, stale_while_revalidate) = options.resolve(ttl, stale_while_revalidate);
                let inner = Arc::downgrade(&self.inner);
                let owned_key = key.to_string();
                self.inner.in_flight.run_fire_and_forget(
                    key,
                    move || async move { loader().await.map_err(CacheError::loader) },
                    move |fresh| {
                        if let Some(inner) = inner.upgrade() {
                            inner.write(&owned_key, fresh, ttl, stale_while_revalidate);
                        }
                    },
                );
                return Ok(value);
            }
            Lookup::Miss => options.resolve(
                self.inner.config.default_ttl,
                self.inner.config.default_stale_window,
            ),
        };

        let inner: Weak<Inner<V>> = Arc::downgrade(&self.inner);
        let owned_key = key.to_string();
        self.inner
            .in_flight
            .run_exclusive(key, move || async move {
                let value = loader().await.map_err(CacheError::loader)?;
                if let Some(inner) = inner.upgrade() {
                    inner.write(&owned_key, value.clone(), ttl, stale_while_revalidate);
                }
                Ok(value)
            })
            .await
    }

    // == Cleanup ==
    /// Removes every dead entry. Returns the number removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_detailed().cleaned
    }

    /// Removes every dead entry and reports the running eviction total.
    pub fn cleanup_detailed(&self) -> CleanupReport {
        let mut state = self.inner.state.lock();
        let cleaned = state.store.sweep(Instant::now());
        state.stats.record_cleanup(cleaned, Utc::now());
        debug!(cleaned, "expiry sweep finished");
        CleanupReport {
            cleaned,
            evictions: state.stats.evictions,
        }
    }

    // == Capacity ==
    /// Changes the capacity at runtime, evicting LRU entries if it shrank.
    pub fn set_max_entries(&self, max_entries: usize) {
        let mut state = self.inner.state.lock();
        state.store.set_max_entries(max_entries);
        let evicted = state.store.evict_if_over_capacity();
        state.stats.record_evictions(evicted);
        info!(max_entries, evicted, "cache capacity changed");
    }

    // == Diagnostics ==
    /// Point-in-time counters and key listing.
    pub fn stats(&self) -> StatsSnapshot {
        let state = self.inner.state.lock();
        state
            .stats
            .snapshot(state.store.keys(), state.store.max_entries())
    }

    /// Per-entry diagnostics, least recently used first.
    pub fn metadata(&self) -> Vec<EntryMetadata> {
        let now = Instant::now();
        let state = self.inner.state.lock();
        state
            .store
            .iter()
            .map(|(key, entry)| EntryMetadata {
                key: key.clone(),
                timestamp: entry.created_at,
                ttl: millis(entry.ttl),
                stale_while_revalidate: millis(entry.stale_while_revalidate),
                value_type: std::any::type_name::<V>(),
                expired: entry.is_expired(now),
                state: entry.freshness(now),
            })
            .collect()
    }

    /// Whether a load for `key` is pending.
    pub fn is_loading(&self, key: &str) -> bool {
        self.inner.in_flight.is_in_flight(key)
    }

    /// Number of loads currently pending across all keys.
    pub fn loading_count(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Current number of entries, including ones not yet swept.
    pub fn len(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
