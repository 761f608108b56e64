//! Memory Backend Module
//!
//! In-process key-value backend with TTL expiration, for local development and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cache::{CacheEntry, Clock, SystemClock};
use crate::error::{CacheError, Result};

use super::Backend;

// == Memory Backend ==
/// HashMap-backed store that enforces expiry against an injectable clock.
///
/// Expired entries are dropped lazily on access and swept on every write.
pub struct MemoryBackend {
    /// Key-value storage
    entries: Mutex<HashMap<String, CacheEntry>>,
    /// Time source for TTL bookkeeping
    clock: Arc<dyn Clock>,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty backend on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty backend on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("memory backend lock poisoned".to_string()))
    }

    // == Purge Expired ==
    /// Removes all expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now_ms();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }

    /// Remaining TTL of `key` in seconds, None if absent or expired.
    pub fn ttl(&self, key: &str) -> Result<Option<u64>> {
        let now = self.clock.now_ms();
        let entries = self.lock()?;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now)))
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now_ms();
        let mut entries = self.lock()?;

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let now = self.clock.now_ms();
        let mut entries = self.lock()?;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(
            key.to_string(),
            CacheEntry::new(value.to_string(), now, ttl_seconds),
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }

    fn name(&self) -> &'static str {
        "memory"
    }

    fn close(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
