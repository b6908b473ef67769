//! Cache Entry Module
//!
//! Defines individual cache entries and the per-write option bag.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::cache::Freshness;

// == Entry Options ==
/// Per-write TTL settings. Unset fields fall back to a default chosen by the
/// caller of [`EntryOptions::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Freshness window
    pub ttl: Option<Duration>,
    /// Extra window after `ttl` during which stale data is still served
    pub stale_while_revalidate: Option<Duration>,
}

impl EntryOptions {
    /// Options with an explicit TTL and the default stale window.
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            stale_while_revalidate: None,
        }
    }

    /// Sets the stale-while-revalidate window.
    pub fn stale_while_revalidate(mut self, window: Duration) -> Self {
        self.stale_while_revalidate = Some(window);
        self
    }

    /// Fills unset fields from the given fallbacks.
    pub fn resolve(&self, ttl: Duration, stale_while_revalidate: Duration) -> (Duration, Duration) {
        (
            self.ttl.unwrap_or(ttl),
            self.stale_while_revalidate.unwrap_or(stale_while_revalidate),
        )
    }
}

/// A bare TTL: no stale window.
impl From<Duration> for EntryOptions {
    fn from(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            stale_while_revalidate: Some(Duration::ZERO),
        }
    }
}

impl From<Option<Duration>> for EntryOptions {
    fn from(ttl: Option<Duration>) -> Self {
        match ttl {
            Some(ttl) => ttl.into(),
            None => Self::default(),
        }
    }
}

// == Cache Entry ==
/// A single cache entry with value and expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Monotonic store time; drives expiry
    pub stored_at: Instant,
    /// Wall-clock store time; diagnostics only
    pub created_at: DateTime<Utc>,
    /// Freshness window from `stored_at`
    pub ttl: Duration,
    /// Additional window after `ttl` during which the value is still served
    pub stale_while_revalidate: Duration,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stored now.
    pub fn new(value: V, ttl: Duration, stale_while_revalidate: Duration) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            created_at: Utc::now(),
            ttl,
            stale_while_revalidate,
        }
    }

    /// Classifies the entry as observed at `now`.
    pub fn freshness(&self, now: Instant) -> Freshness {
        Freshness::classify(self.stored_at, self.ttl, self.stale_while_revalidate, now)
    }

    // == Is Expired ==
    /// Checks whether the TTL has elapsed, regardless of the stale window.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.freshness(now) != Freshness::Fresh
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ttl_disables_stale_window() {
        let options = EntryOptions::from(Duration::from_secs(10));
        assert_eq!(options.ttl, Some(Duration::from_secs(10)));
        assert_eq!(options.stale_while_revalidate, Some(Duration::ZERO));

        let resolved = options.resolve(Duration::from_secs(300), Duration::from_secs(60));
        assert_eq!(resolved, (Duration::from_secs(10), Duration::ZERO));
    }

    #[test]
    fn test_default_options_use_fallbacks() {
        let resolved =
            EntryOptions::default().resolve(Duration::from_secs(300), Duration::from_secs(60));
        assert_eq!(resolved, (Duration::from_secs(300), Duration::from_secs(60)));
    }

    #[test]
    fn test_partial_options() {
        let options = EntryOptions::ttl(Duration::from_secs(5));
        let resolved = options.resolve(Duration::from_secs(300), Duration::from_secs(60));
        assert_eq!(resolved, (Duration::from_secs(5), Duration::from_secs(60)));

        let options = EntryOptions::default().stale_while_revalidate(Duration::from_secs(1));
        let resolved = options.resolve(Duration::from_secs(300), Duration::from_secs(60));
        assert_eq!(resolved, (Duration::from_secs(300), Duration::from_secs(1)));
    }

    #[test]
    fn test_optional_ttl_conversion() {
        assert_eq!(EntryOptions::from(None), EntryOptions::default());
        assert_eq!(
            EntryOptions::from(Some(Duration::from_secs(1))),
            EntryOptions::from(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_entry_freshness() {
        let entry = CacheEntry::new("v", Duration::from_secs(1), Duration::from_secs(2));
        let start = entry.stored_at;

        assert_eq!(entry.freshness(start), Freshness::Fresh);
        assert!(!entry.is_expired(start));
        assert_eq!(
            entry.freshness(start + Duration::from_millis(1500)),
            Freshness::Stale
        );
        assert!(entry.is_expired(start + Duration::from_millis(1500)));
        assert_eq!(entry.freshness(start + Duration::from_secs(3)), Freshness::Dead);
    }
}
