//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.
//! Invalid values never fail construction; each one falls back to its default.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default maximum number of cached entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default freshness window (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default stale-while-revalidate window (disabled).
pub const DEFAULT_STALE_WINDOW: Duration = Duration::ZERO;

/// Cache engine configuration, read once when a cache is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries; `0` disables caching entirely
    pub max_entries: usize,
    /// TTL applied when a write does not specify one
    pub default_ttl: Duration,
    /// Stale window applied when a write does not specify one
    pub default_stale_window: Duration,
}

impl CacheConfig {
    /// Builds a config from raw, possibly invalid, setting values.
    ///
    /// Missing, non-numeric and negative values fall back independently to
    /// their documented defaults.
    pub fn from_settings(
        max_entries: Option<&str>,
        default_ttl_ms: Option<&str>,
        default_stale_window_ms: Option<&str>,
    ) -> Self {
        Self {
            max_entries: parse_or(max_entries, DEFAULT_MAX_ENTRIES),
            default_ttl: parse_millis_or(default_ttl_ms, DEFAULT_TTL),
            default_stale_window: parse_millis_or(default_stale_window_ms, DEFAULT_STALE_WINDOW),
        }
    }

    /// Loads the cache config from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_DEFAULT_STALE_WINDOW_MS` - Default SWR window in milliseconds (default: 0)
    pub fn from_env() -> Self {
        Self::from_settings(
            env::var("CACHE_MAX_ENTRIES").ok().as_deref(),
            env::var("CACHE_DEFAULT_TTL_MS").ok().as_deref(),
            env::var("CACHE_DEFAULT_STALE_WINDOW_MS").ok().as_deref(),
        )
    }

    /// Returns a copy with a different capacity.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Returns a copy with a different default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Returns a copy with a different default stale window.
    pub fn with_default_stale_window(mut self, window: Duration) -> Self {
        self.default_stale_window = window;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: DEFAULT_TTL,
            default_stale_window: DEFAULT_STALE_WINDOW,
        }
    }
}

/// Process configuration for the diagnostics server binary.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache engine settings
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    ///
    /// Cache settings are read by [`CacheConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            cache: CacheConfig::from_env(),
            server_port: parse_or(env::var("SERVER_PORT").ok().as_deref(), 3000),
            cleanup_interval: parse_or(env::var("CLEANUP_INTERVAL").ok().as_deref(), 60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Parses a whole number of milliseconds.
fn parse_millis_or(raw: Option<&str>, default: Duration) -> Duration {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.default_ttl, Duration::from_secs(300));
        assert_eq!(config.default_stale_window, Duration::ZERO);
    }

    #[test]
    fn test_from_settings_valid_values() {
        let config = CacheConfig::from_settings(Some("25"), Some("1500"), Some("250"));
        assert_eq!(config.max_entries, 25);
        assert_eq!(config.default_ttl, Duration::from_millis(1500));
        assert_eq!(config.default_stale_window, Duration::from_millis(250));
    }

    #[test]
    fn test_from_settings_invalid_values_fall_back() {
        let config = CacheConfig::from_settings(Some("lots"), Some("-5"), Some("1.5"));
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_from_settings_fall_back_independently() {
        let config = CacheConfig::from_settings(Some("abc"), Some("2000"), None);
        assert_eq!(config.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(config.default_ttl, Duration::from_millis(2000));
        assert_eq!(config.default_stale_window, DEFAULT_STALE_WINDOW);
    }

    #[test]
    fn test_from_settings_zero_capacity_is_valid() {
        let config = CacheConfig::from_settings(Some("0"), None, None);
        assert_eq!(config.max_entries, 0);
    }

    #[test]
    fn test_parse_millis_or() {
        let fallback = Duration::from_secs(9);
        assert_eq!(parse_millis_or(Some(" 750 "), fallback), Duration::from_millis(750));
        assert_eq!(parse_millis_or(Some("0"), fallback), Duration::ZERO);
        assert_eq!(parse_millis_or(Some("-1"), fallback), fallback);
        assert_eq!(parse_millis_or(None, fallback), fallback);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("CACHE_MAX_ENTRIES");
        env::remove_var("CACHE_DEFAULT_TTL_MS");
        env::remove_var("CACHE_DEFAULT_STALE_WINDOW_MS");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
    }
}
