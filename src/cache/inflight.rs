//! In-Flight Coordinator Module
//!
//! Deduplicates concurrent loads per key. Every caller asking for a key that
//! is already loading joins the pending load instead of starting another.
//!
//! Each load runs on its own tokio task, so it settles (and clears its
//! record) even if every caller waiting on it is dropped.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};

/// A pending load that any number of callers can await.
pub type SharedLoad<V> = Shared<BoxFuture<'static, Result<V>>>;

type Registry<V> = Mutex<HashMap<String, SharedLoad<V>>>;

enum Flight<V> {
    Started(SharedLoad<V>),
    Joined(SharedLoad<V>),
}

// == In-Flight Coordinator ==
/// Registry of pending loads, at most one per key.
pub struct InFlight<V> {
    pending: Arc<Registry<V>>,
}

impl<V> InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Joins the load pending for `key`, or spawns and registers a new one.
    ///
    /// The lookup, the spawn and the registration happen under one lock
    /// acquisition. `loader` runs on the spawned task, never under the
    /// registry lock. A panicking loader settles as [`CacheError::Loader`].
    fn start_or_join<F, Fut>(&self, key: &str, loader: F) -> Flight<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let mut pending = self.pending.lock();
        if let Some(existing) = pending.get(key) {
            debug!(key = %key, "joined in-flight load");
            return Flight::Joined(existing.clone());
        }

        let registry: Weak<Registry<V>> = Arc::downgrade(&self.pending);
        let owned_key = key.to_string();
        let task = tokio::spawn(async move {
            let result = match AssertUnwindSafe(async move { loader().await })
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(&*payload);
                    warn!(key = %owned_key, panic = %message, "loader panicked");
                    Err(CacheError::loader(anyhow::anyhow!("loader panicked: {message}")))
                }
            };
            // Only this load owns the record for `owned_key`. The insert below
            // completes before this lock can be taken.
            if let Some(registry) = registry.upgrade() {
                registry.lock().remove(&owned_key);
            }
            result
        });

        let load = async move {
            match task.await {
                Ok(result) => result,
                Err(err) => Err(CacheError::loader(anyhow::anyhow!("load task failed: {err}"))),
            }
        }
        .boxed()
        .shared();

        pending.insert(key.to_string(), load.clone());
        Flight::Started(load)
    }

    // == Run Exclusive ==
    /// Returns the single shared load for `key`, starting `loader` only if
    /// nothing is pending yet.
    ///
    /// The load is already running when this returns; dropping the returned
    /// future does not cancel it. The registry record is removed before any
    /// waiter observes the outcome, so a failed load is never handed out to
    /// a later caller. Must be called from within a tokio runtime.
    pub fn run_exclusive<F, Fut>(&self, key: &str, loader: F) -> SharedLoad<V>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        match self.start_or_join(key, loader) {
            Flight::Started(load) | Flight::Joined(load) => load,
        }
    }

    // == Run Fire And Forget ==
    /// Starts a detached load for `key` unless one is already pending.
    ///
    /// `on_success` runs with the loaded value before the record is cleared.
    /// Failures are logged and dropped here; they never reach a caller.
    /// Returns whether a new load was started. Must be called from within a
    /// tokio runtime.
    pub fn run_fire_and_forget<F, Fut, S>(&self, key: &str, loader: F, on_success: S) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
        S: FnOnce(V) + Send + 'static,
    {
        let owned_key = key.to_string();
        let flight = self.start_or_join(key, move || async move {
            match loader().await {
                Ok(value) => {
                    on_success(value.clone());
                    debug!(key = %owned_key, "background revalidation finished");
                    Ok(value)
                }
                Err(err) => {
                    warn!(key = %owned_key, error = %err, "background revalidation failed");
                    Err(err)
                }
            }
        });

        match flight {
            Flight::Joined(_) => false,
            Flight::Started(_) => {
                debug!(key = %key, "started background revalidation");
                true
            }
        }
    }

    /// Whether a load for `key` is pending.
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.pending.lock().contains_key(key)
    }

    /// Number of pending loads.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl<V> Default for InFlight<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
