//! Cache Statistics Module
//!
//! Tracks cache activity (hits, misses, writes, failures) and reports cache health.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::CacheStore;

// == Store Counters ==
/// Lock-free counters owned by a `CacheStore`.
#[derive(Debug, Default)]
pub struct StoreCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
    errors: AtomicU64,
}

impl StoreCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the hit counter.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the miss counter (absent, expired, undecodable or unavailable).
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the confirmed write counter.
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the failed write counter.
    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments the backend error counter.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}

// == Cache Stats ==
/// Point-in-time view of cache health. Recomputed on every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// True when the cache is switched on and the backing store is reachable
    pub enabled: bool,
    /// Name of the backend in use
    pub backend: String,
    /// Number of lookups answered from the store
    pub hits: u64,
    /// Number of lookups that found nothing usable
    pub misses: u64,
    /// Number of confirmed writes
    pub writes: u64,
    /// Number of writes that did not reach the store
    pub write_failures: u64,
    /// Number of backend errors observed
    pub errors: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Reporter ==
/// Read-only health reporter over a shared `CacheStore`.
#[derive(Clone)]
pub struct StatsReporter {
    store: Arc<CacheStore>,
}

impl StatsReporter {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    /// Returns current cache statistics. Never fails.
    ///
    /// May probe the backend (blocking) if no operation has been attempted yet.
    /// Counters are zero while the cache is switched off or unreachable.
    pub fn stats(&self) -> CacheStats {
        let backend = self.store.backend_name().to_string();
        if !self.store.is_available() {
            return CacheStats {
                enabled: false,
                backend,
                ..CacheStats::default()
            };
        }

        let counters = self.store.counters();
        CacheStats {
            enabled: true,
            backend,
            hits: counters.hits(),
            misses: counters.misses(),
            writes: counters.writes(),
            write_failures: counters.write_failures(),
            errors: counters.errors(),
        }
    }
}
