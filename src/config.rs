//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for writes without an explicit TTL, 0 = never expire
    pub default_ttl: u64,
    /// Janitor interval in seconds, 0 = janitor disabled
    pub cleanup_interval: u64,
    /// Number of entries to pre-allocate room for
    pub capacity_hint: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Snapshot file used by save/load and at startup/shutdown
    pub snapshot_file: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Janitor frequency in seconds (default: 600)
    /// - `CAPACITY_HINT` - Pre-allocated entry count (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `SNAPSHOT_FILE` - Snapshot path (default: db.dat)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: parse_env("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            capacity_hint: parse_env("CAPACITY_HINT").unwrap_or(defaults.capacity_hint),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            snapshot_file: env::var_os("SNAPSHOT_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_file),
        }
    }

    /// Default TTL as a duration, None when entries never expire by default.
    pub fn default_ttl(&self) -> Option<Duration> {
        (self.default_ttl > 0).then(|| Duration::from_secs(self.default_ttl))
    }

    /// Janitor interval; zero disables the janitor.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            cleanup_interval: 600,
            capacity_hint: 0,
            server_port: 8080,
            snapshot_file: PathBuf::from("db.dat"),
        }
    }
}
