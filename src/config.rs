//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Cache and server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// A missing or unusable `store_url` is not fatal: the cache runs degraded.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backing store URL (`redis://...` or `memory://`), None = no store
    pub store_url: Option<String>,
    /// Master switch, independent of connectivity
    pub enabled: bool,
    /// Default TTL in seconds when callers do not specify one
    pub default_ttl: u64,
    /// Prefix prepended to every key sent to the store
    pub key_prefix: String,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Per-operation read/write timeout in milliseconds
    pub operation_timeout_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Availability probe interval in seconds (0 disables the probe)
    pub probe_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_URL` - Backing store URL (falls back to `REDIS_URL`, default: unset)
    /// - `CACHE_ENABLED` - Master switch (default: true)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_KEY_PREFIX` - Key prefix (default: empty)
    /// - `CACHE_CONNECT_TIMEOUT_MS` - Connect timeout (default: 500)
    /// - `CACHE_OPERATION_TIMEOUT_MS` - Operation timeout (default: 500)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PROBE_INTERVAL` - Probe frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            store_url: env::var("CACHE_URL")
                .or_else(|_| env::var("REDIS_URL"))
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.enabled),
            default_ttl: parse_var("CACHE_DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            connect_timeout_ms: parse_var("CACHE_CONNECT_TIMEOUT_MS")
                .unwrap_or(defaults.connect_timeout_ms),
            operation_timeout_ms: parse_var("CACHE_OPERATION_TIMEOUT_MS")
                .unwrap_or(defaults.operation_timeout_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            probe_interval: parse_var("PROBE_INTERVAL").unwrap_or(defaults.probe_interval),
        }
    }

    /// Returns the connect timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the operation timeout as a Duration.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_url: None,
            enabled: true,
            default_ttl: 300,
            key_prefix: String::new(),
            connect_timeout_ms: 500,
            operation_timeout_ms: 500,
            server_port: 3000,
            probe_interval: 30,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
