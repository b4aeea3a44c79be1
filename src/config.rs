//! Configuration Module
//!
//! Loads cache node configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Cache node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the node holds before LRU replacement
    pub max_entries: usize,
    /// Lifetime in milliseconds for entries stored without one
    pub default_lifetime_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_LIFETIME_MS` - Default entry lifetime in ms (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_lifetime_ms: env_or("DEFAULT_LIFETIME_MS", defaults.default_lifetime_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_lifetime_ms: 300_000,
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
