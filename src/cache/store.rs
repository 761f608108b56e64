//! Cache Store Module
//!
//! Typed get/set/delete over a backing store, with availability tracking and
//! graceful degradation when the store cannot be reached.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{Backend, MemoryBackend, NullBackend, RedisBackend, StoreCounters};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// URL that selects the in-process backend.
pub const MEMORY_URL: &str = "memory://";

// Availability states. UNKNOWN until the first operation or probe.
const UNKNOWN: u8 = 0;
const AVAILABLE: u8 = 1;
const DEGRADED: u8 = 2;

// == Lookup ==
/// Outcome of a read, before it is collapsed to `Option` at the public boundary.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lookup<T> {
    /// The store returned a decodable value
    Hit(T),
    /// The store answered and had nothing usable
    Miss,
    /// The store could not be asked (disabled or unreachable)
    Unavailable,
}

impl<T> Lookup<T> {
    pub(crate) fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Unavailable => None,
        }
    }
}

// == Cache Store ==
/// Shared handle to the backing store.
///
/// Never returns connectivity errors: a failed operation flips the store to
/// degraded and reports "absent"/`false`. Every call still tries the backend,
/// so the store recovers on its own once the backend answers again.
pub struct CacheStore {
    /// Backing key-value service
    backend: Arc<dyn Backend>,
    /// Master switch, independent of connectivity
    enabled: bool,
    /// Default TTL in seconds for writes without explicit TTL
    default_ttl: u64,
    /// Prefix prepended to every key sent to the backend
    key_prefix: String,
    /// Latest observed availability
    state: AtomicU8,
    /// Set by `close`; every later call is treated as unreachable
    closed: AtomicBool,
    /// Activity counters
    counters: StoreCounters,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an enabled store over `backend`.
    ///
    /// # Arguments
    /// * `backend` - The key-value service to talk to
    /// * `default_ttl` - Default TTL in seconds for writes without explicit TTL
    pub fn new(backend: Arc<dyn Backend>, default_ttl: u64) -> Self {
        Self {
            backend,
            enabled: true,
            default_ttl,
            key_prefix: String::new(),
            state: AtomicU8::new(UNKNOWN),
            closed: AtomicBool::new(false),
            counters: StoreCounters::new(),
        }
    }

    /// Sets the master switch.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the prefix prepended to every key.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    // == Connect ==
    /// Builds a store from configuration. Never fails.
    ///
    /// A missing or unusable URL yields a store on `NullBackend`, which
    /// stays degraded for the life of the process. No connection is made
    /// here; the first operation or probe does that.
    pub fn connect(config: &Config) -> Self {
        let backend: Arc<dyn Backend> = match config.store_url.as_deref() {
            None => {
                info!("No cache store URL configured, caching is pass-through");
                Arc::new(NullBackend::new("no store URL configured"))
            }
            Some(MEMORY_URL) => Arc::new(MemoryBackend::new()),
            Some(url) => match RedisBackend::open(
                url,
                config.connect_timeout(),
                config.operation_timeout(),
            ) {
                Ok(backend) => Arc::new(backend),
                Err(err) => {
                    warn!(error = %err, "Cache store URL rejected, caching is pass-through");
                    Arc::new(NullBackend::new(err.to_string()))
                }
            },
        };

        Self::new(backend, config.default_ttl)
            .with_enabled(config.enabled)
            .with_key_prefix(config.key_prefix.clone())
    }

    fn full_key<'a>(&self, key: &'a str) -> Cow<'a, str> {
        if self.key_prefix.is_empty() {
            Cow::Borrowed(key)
        } else {
            Cow::Owned(format!("{}{}", self.key_prefix, key))
        }
    }

    /// True while the master switch is on and the store has not been closed.
    fn is_active(&self) -> bool {
        self.enabled && !self.closed.load(Ordering::SeqCst)
    }

    fn mark_available(&self) {
        if self.state.swap(AVAILABLE, Ordering::SeqCst) == DEGRADED {
            info!(backend = self.backend.name(), "Cache store reachable again");
        }
    }

    /// Records a failed operation. Returns true when this failure starts a
    /// new degraded episode, which is the only time a warning is logged.
    fn mark_degraded(&self, operation: &str, err: &CacheError) -> bool {
        self.counters.record_error();
        if self.state.swap(DEGRADED, Ordering::SeqCst) != DEGRADED {
            warn!(
                backend = self.backend.name(),
                operation,
                error = %err,
                "Cache store unavailable, running uncached"
            );
            true
        } else {
            debug!(backend = self.backend.name(), operation, error = %err, "Cache store still unavailable");
            false
        }
    }

    // == Fetch ==
    /// Reads and decodes `key`, keeping miss and unavailable apart.
    pub(crate) fn fetch<T: DeserializeOwned>(&self, key: &str) -> Lookup<T> {
        if !self.is_active() {
            self.counters.record_miss();
            return Lookup::Unavailable;
        }

        let raw = match self.backend.get(&self.full_key(key)) {
            Ok(raw) => {
                self.mark_available();
                raw
            }
            Err(err) => {
                self.mark_degraded("get", &err);
                self.counters.record_miss();
                return Lookup::Unavailable;
            }
        };

        match raw.map(|raw| serde_json::from_str::<T>(&raw)) {
            Some(Ok(value)) => {
                self.counters.record_hit();
                Lookup::Hit(value)
            }
            Some(Err(err)) => {
                warn!(key, error = %err, "Cached value could not be decoded, treating as miss");
                self.counters.record_miss();
                Lookup::Miss
            }
            None => {
                self.counters.record_miss();
                Lookup::Miss
            }
        }
    }

    // == Get ==
    /// Retrieves the value stored under `key`.
    ///
    /// Returns None when the key is absent, expired, undecodable as `T`, or
    /// when the store is disabled or unreachable.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.fetch(key).into_option()
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl` seconds (default TTL if None).
    ///
    /// Returns `Ok(true)` on a confirmed write and `Ok(false)` when the write
    /// did not happen (disabled, unreachable, or zero TTL). The only error is
    /// `CacheError::Serialization` for values that cannot be encoded.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) -> Result<bool> {
        if !self.is_active() {
            self.counters.record_write_failure();
            return Ok(false);
        }

        let encoded = serde_json::to_string(value)?;
        Ok(self.set_encoded(key, &encoded, ttl))
    }

    /// Stores an already-encoded value. Same semantics as `set`.
    pub(crate) fn set_encoded(&self, key: &str, encoded: &str, ttl: Option<u64>) -> bool {
        if !self.is_active() {
            self.counters.record_write_failure();
            return false;
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl == 0 {
            debug!(key, "Zero TTL, value not stored");
            self.counters.record_write_failure();
            return false;
        }

        match self.backend.set_ex(&self.full_key(key), encoded, ttl) {
            Ok(()) => {
                self.mark_available();
                self.counters.record_write();
                true
            }
            Err(err) => {
                self.mark_degraded("set", &err);
                self.counters.record_write_failure();
                false
            }
        }
    }

    // == Delete ==
    /// Removes `key`, best effort. A missing key is not an error.
    pub fn delete(&self, key: &str) {
        if !self.is_active() {
            return;
        }

        match self.backend.delete(&self.full_key(key)) {
            Ok(removed) => {
                self.mark_available();
                debug!(key, removed, "Cache key deleted");
            }
            Err(err) => {
                self.mark_degraded("delete", &err);
            }
        }
    }

    // == Availability ==
    /// Returns the latest observed availability.
    ///
    /// Probes the backend if nothing has been attempted yet. Always false
    /// when the master switch is off or the store has been closed.
    pub fn is_available(&self) -> bool {
        if !self.is_active() {
            return false;
        }

        match self.state.load(Ordering::SeqCst) {
            UNKNOWN => self.probe(),
            state => state == AVAILABLE,
        }
    }

    /// Pings the backend and records the outcome.
    pub fn probe(&self) -> bool {
        if !self.is_active() {
            return false;
        }

        match self.backend.ping() {
            Ok(()) => {
                self.mark_available();
                true
            }
            Err(err) => {
                self.mark_degraded("ping", &err);
                false
            }
        }
    }

    // == Close ==
    /// Releases the backend. Later calls behave as if the store were
    /// unreachable: reads miss, writes return false, nothing reaches the backend.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.backend.close();
        info!(backend = self.backend.name(), "Cache store closed");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub(crate) fn counters(&self) -> &StoreCounters {
        &self.counters
    }
}
