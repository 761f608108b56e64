//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the topics endpoint (GET /topics)
#[derive(Debug, Clone, Serialize)]
pub struct TopicsResponse {
    /// The brand the topics were generated for
    pub brand: String,
    /// The generated topics
    pub topics: Vec<String>,
    /// True when the result came from the cache
    pub cached: bool,
}

impl TopicsResponse {
    /// Creates a new TopicsResponse
    pub fn new(brand: impl Into<String>, topics: Vec<String>, cached: bool) -> Self {
        Self {
            brand: brand.into(),
            topics,
            cached,
        }
    }
}

/// Response body for the DELETE operation (DELETE /keys/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Status message
    pub message: String,
    /// The key that was invalidated
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' invalidated", key),
            key,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Cache switched on and store reachable
    pub enabled: bool,
    /// Backend name
    pub backend: String,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of confirmed writes
    pub writes: u64,
    /// Number of failed writes
    pub write_failures: u64,
    /// Number of backend errors
    pub errors: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            enabled: stats.enabled,
            backend: stats.backend,
            hits: stats.hits,
            misses: stats.misses,
            writes: stats.writes,
            write_failures: stats.write_failures,
            errors: stats.errors,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
