//! Expiry Policy Module
//!
//! Classifies an entry as fresh, stale-but-usable, or dead from its age.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

// == Freshness ==
/// Classification of a stored entry relative to its TTL and stale window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    /// `now < stored_at + ttl`
    Fresh,
    /// `stored_at + ttl <= now < stored_at + ttl + stale_while_revalidate`
    Stale,
    /// Past both windows; must not be served
    Dead,
}

impl Freshness {
    // == Classify ==
    /// Classifies an entry stored at `stored_at` as observed at `now`.
    ///
    /// Windows are half-open: an entry is stale at exactly `stored_at + ttl`
    /// and dead at exactly `stored_at + ttl + stale_while_revalidate`.
    pub fn classify(
        stored_at: Instant,
        ttl: Duration,
        stale_while_revalidate: Duration,
        now: Instant,
    ) -> Self {
        let age = now.saturating_duration_since(stored_at);
        if age < ttl {
            Freshness::Fresh
        } else if age < ttl.saturating_add(stale_while_revalidate) {
            Freshness::Stale
        } else {
            Freshness::Dead
        }
    }

    /// Whether cached data may be returned to the caller.
    pub fn is_usable(self) -> bool {
        matches!(self, Freshness::Fresh | Freshness::Stale)
    }

    /// Whether a read should kick off a background reload.
    pub fn should_revalidate_in_background(self) -> bool {
        self == Freshness::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(1000);
    const SWR: Duration = Duration::from_millis(2000);

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_classify_windows() {
        let base = Instant::now();

        assert_eq!(Freshness::classify(base, TTL, SWR, base), Freshness::Fresh);
        assert_eq!(Freshness::classify(base, TTL, SWR, at(base, 999)), Freshness::Fresh);
        assert_eq!(Freshness::classify(base, TTL, SWR, at(base, 1000)), Freshness::Stale);
        assert_eq!(Freshness::classify(base, TTL, SWR, at(base, 2999)), Freshness::Stale);
        assert_eq!(Freshness::classify(base, TTL, SWR, at(base, 3000)), Freshness::Dead);
    }

    #[test]
    fn test_classify_without_stale_window() {
        let base = Instant::now();

        assert_eq!(
            Freshness::classify(base, TTL, Duration::ZERO, at(base, 999)),
            Freshness::Fresh
        );
        assert_eq!(
            Freshness::classify(base, TTL, Duration::ZERO, at(base, 1000)),
            Freshness::Dead
        );
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let base = Instant::now();
        assert_eq!(
            Freshness::classify(base, Duration::ZERO, Duration::ZERO, base),
            Freshness::Dead
        );
        assert_eq!(
            Freshness::classify(base, Duration::ZERO, SWR, base),
            Freshness::Stale
        );
    }

    #[test]
    fn test_huge_windows_do_not_overflow() {
        let base = Instant::now();
        assert_eq!(
            Freshness::classify(base, Duration::MAX, Duration::MAX, at(base, 10)),
            Freshness::Fresh
        );
    }

    #[test]
    fn test_usability() {
        assert!(Freshness::Fresh.is_usable());
        assert!(Freshness::Stale.is_usable());
        assert!(!Freshness::Dead.is_usable());

        assert!(!Freshness::Fresh.should_revalidate_in_background());
        assert!(Freshness::Stale.should_revalidate_in_background());
        assert!(!Freshness::Dead.should_revalidate_in_background());
    }
}
