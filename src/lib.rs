//! Memo Cache - A deterministic result cache
//!
//! Memoizes expensive, idempotent computations in a Redis-compatible
//! key-value store, and degrades to pass-through when the store is gone.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod topics;

pub use api::AppState;
pub use cache::{CacheKey, CacheStats, CacheStore, CallArgs, Computation, Memoizer, StatsReporter};
pub use config::Config;
pub use error::CacheError;
pub use tasks::spawn_availability_probe;
