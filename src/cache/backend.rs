//! Backend Module
//!
//! The key-value protocol the cache store speaks: GET, SET with expiry, DEL and PING.

use crate::error::{CacheError, Result};

// == Backend Trait ==
/// A key-value service with per-entry TTL.
///
/// Every method performs blocking I/O and must be bounded by a timeout.
/// Any `Err` is treated by the store as a connectivity failure. Expiry is
/// enforced by the backend, never by the client.
pub trait Backend: Send + Sync {
    /// Returns the stored value, or None if absent or expired
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key` for `ttl_seconds`, overwriting unconditionally
    fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    /// Removes `key`; returns whether it existed
    fn delete(&self, key: &str) -> Result<bool>;

    /// Checks that the service is reachable
    fn ping(&self) -> Result<()>;

    /// Short name used in logs and stats
    fn name(&self) -> &'static str;

    /// Releases any held resources. Further calls may fail.
    fn close(&self) {}
}

// == Null Backend ==
/// The backend used when no store is configured or the configured one is unusable.
///
/// Every operation fails, which keeps the store permanently degraded.
#[derive(Debug, Clone, Default)]
pub struct NullBackend {
    reason: String,
}

impl NullBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable<T>(&self) -> Result<T> {
        Err(CacheError::Backend(format!(
            "no backing store: {}",
            self.reason
        )))
    }
}

impl Backend for NullBackend {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        self.unavailable()
    }

    fn set_ex(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> Result<()> {
        self.unavailable()
    }

    fn delete(&self, _key: &str) -> Result<bool> {
        self.unavailable()
    }

    fn ping(&self) -> Result<()> {
        self.unavailable()
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
