//! Cache Module
//!
//! Deterministic result caching over a key-value backing store: key derivation,
//! TTL storage with graceful degradation, memoization and health reporting.

mod backend;
mod clock;
mod entry;
mod key;
mod memoize;
mod memory;
mod redis_backend;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{Backend, NullBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use key::{CacheKey, CallArgs, IntoArg};
pub use memoize::{Computation, Memoized, Memoizer};
pub use memory::MemoryBackend;
pub use redis_backend::RedisBackend;
pub use stats::{CacheStats, StatsReporter, StoreCounters};
pub use store::{CacheStore, MEMORY_URL};
