//! Memoizer Module
//!
//! Runs deterministic computations through the cache: derive the key, try the
//! store, compute on miss, store the result.
//!
//! There is no single-flight guarantee. Concurrent misses on the same key
//! each compute and each write; the last write wins.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::store::Lookup;
use crate::cache::{CacheKey, CacheStore, CallArgs};
use crate::error::CacheError;

// == Computation ==
/// A computation that knows how it is cached.
///
/// Implementors bundle the namespace, TTL, distinguishing arguments and the
/// work itself, so a cached call site cannot forget any of them.
pub trait Computation {
    type Output: Serialize + DeserializeOwned;
    type Error: From<CacheError>;

    /// Logical operation name, e.g. `"topic-generation"`
    fn namespace(&self) -> &str;

    /// TTL in seconds; None uses the store default
    fn ttl_seconds(&self) -> Option<u64> {
        None
    }

    /// Arguments that distinguish one result from another
    fn args(&self) -> CallArgs;

    /// Does the work. Called only on a cache miss.
    fn compute(&self) -> Result<Self::Output, Self::Error>;
}

// == Memoizer ==
/// Cache-through executor over a shared `CacheStore`.
#[derive(Clone)]
pub struct Memoizer {
    store: Arc<CacheStore>,
}

impl Memoizer {
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    // == Memoize ==
    /// Returns the cached result for (`namespace`, `args`), computing it on a miss.
    ///
    /// `compute` runs at most once per call. Its error is returned unchanged
    /// and nothing is written. A result that cannot be serialized is
    /// reported as `CacheError::Serialization` converted into `E`; any
    /// other store failure is invisible to the caller.
    pub fn memoize<T, E, F>(
        &self,
        namespace: &str,
        ttl_seconds: Option<u64>,
        args: &CallArgs,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Result<T, E>,
    {
        let key = CacheKey::build(namespace, args);

        match self.store.fetch::<T>(key.as_str()) {
            Lookup::Hit(value) => {
                debug!(key = %key, "Memoized result served from cache");
                return Ok(value);
            }
            Lookup::Miss => debug!(key = %key, "Cache miss, computing"),
            Lookup::Unavailable => debug!(key = %key, "Cache unavailable, computing uncached"),
        }

        let value = compute()?;
        let encoded = serde_json::to_string(&value).map_err(CacheError::from)?;
        self.store.set_encoded(key.as_str(), &encoded, ttl_seconds);

        Ok(value)
    }

    /// Async form of `memoize`.
    ///
    /// Store calls run on the blocking pool so the async worker never waits
    /// on network I/O; `compute` runs on the calling task.
    pub async fn memoize_async<T, E, F, Fut>(
        &self,
        namespace: &str,
        ttl_seconds: Option<u64>,
        args: &CallArgs,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = CacheKey::build(namespace, args);

        let store = self.store.clone();
        let lookup_key = key.clone();
        let cached = tokio::task::spawn_blocking(move || store.fetch::<T>(lookup_key.as_str()))
            .await
            .unwrap_or_else(|err| {
                warn!(key = %key, error = %err, "Cache lookup task failed");
                Lookup::Unavailable
            });

        if let Lookup::Hit(value) = cached {
            debug!(key = %key, "Memoized result served from cache");
            return Ok(value);
        }

        let value = compute().await?;
        let encoded = serde_json::to_string(&value).map_err(CacheError::from)?;

        let store = self.store.clone();
        let write = tokio::task::spawn_blocking(move || {
            store.set_encoded(key.as_str(), &encoded, ttl_seconds)
        });
        if let Err(err) = write.await {
            warn!(error = %err, "Cache write task failed");
        }

        Ok(value)
    }

    /// Runs a `Computation` through the cache.
    pub fn run<C: Computation>(&self, computation: &C) -> Result<C::Output, C::Error> {
        self.memoize(
            computation.namespace(),
            computation.ttl_seconds(),
            &computation.args(),
            || computation.compute(),
        )
    }

    // == Wrap ==
    /// Wraps `func` so every call goes through the cache under `namespace`.
    pub fn wrap<F>(&self, namespace: impl Into<String>, ttl_seconds: Option<u64>, func: F) -> Memoized<F> {
        Memoized {
            memoizer: self.clone(),
            namespace: namespace.into(),
            ttl_seconds,
            func,
        }
    }
}

// == Memoized ==
/// A function bound to a namespace and TTL; see `Memoizer::wrap`.
pub struct Memoized<F> {
    memoizer: Memoizer,
    namespace: String,
    ttl_seconds: Option<u64>,
    func: F,
}

impl<F> Memoized<F> {
    /// Calls the wrapped function, or returns its cached result for `args`.
    pub fn call<T, E>(&self, args: &CallArgs) -> Result<T, E>
    where
        F: Fn(&CallArgs) -> Result<T, E>,
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
    {
        self.memoizer
            .memoize(&self.namespace, self.ttl_seconds, args, || (self.func)(args))
    }

    /// Returns the key a call with `args` would use.
    pub fn key_for(&self, args: &CallArgs) -> CacheKey {
        CacheKey::build(&self.namespace, args)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}
