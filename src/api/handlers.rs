//! API Handlers
//!
//! HTTP request handlers for the cache observability and demo endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::warn;

use crate::cache::{CacheStats, CacheStore, Computation, Memoizer, StatsReporter};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{DeleteResponse, HealthResponse, StatsResponse, TopicsQuery, TopicsResponse};
use crate::topics::{self, TopicRequest};

/// Application state shared across all handlers.
///
/// The store is shared by the memoizer and the reporter; nothing else
/// holds a handle to the backend.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store
    pub store: Arc<CacheStore>,
    /// Cache-through executor
    pub memoizer: Memoizer,
    /// Health reporter
    pub reporter: StatsReporter,
}

impl AppState {
    /// Creates a new AppState around the given cache store.
    pub fn new(store: CacheStore) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Creates a new AppState around an already shared store.
    pub fn from_shared(store: Arc<CacheStore>) -> Self {
        Self {
            memoizer: Memoizer::new(store.clone()),
            reporter: StatsReporter::new(store.clone()),
            store,
        }
    }

    /// Creates a new AppState from configuration. Never fails; see `CacheStore::connect`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheStore::connect(config))
    }
}

/// Handler for GET /topics
///
/// Returns generated topics for a brand, served from the cache when possible.
pub async fn topics_handler(
    State(state): State<AppState>,
    Query(query): Query<TopicsQuery>,
) -> Result<Json<TopicsResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let request = TopicRequest::new(query.brand.trim(), query.limit);
    let mut computed = false;

    let topics = state
        .memoizer
        .memoize_async(topics::NAMESPACE, query.ttl, &request.args(), || {
            computed = true;
            async { request.compute() }
        })
        .await?;

    Ok(Json(TopicsResponse::new(request.brand.clone(), topics, !computed)))
}

/// Handler for DELETE /keys/:key
///
/// Invalidates one cache key. Best effort: succeeds whether or not the key
/// existed or the store was reachable.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let store = state.store.clone();
    let target = key.clone();
    tokio::task::spawn_blocking(move || store.delete(&target))
        .await
        .map_err(|e| CacheError::Internal(e.to_string()))?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics. Never fails.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let reporter = state.reporter.clone();
    let stats = tokio::task::spawn_blocking(move || reporter.stats())
        .await
        .unwrap_or_else(|err| {
            warn!(error = %err, "Stats task failed");
            CacheStats::default()
        });

    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
///
/// Returns health status of the server. Cache availability is not part of
/// liveness: the server works uncached.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryBackend, NullBackend};

    fn memory_state() -> AppState {
        AppState::new(CacheStore::new(Arc::new(MemoryBackend::new()), 300))
    }

    fn query(brand: &str, limit: usize) -> Query<TopicsQuery> {
        Query(TopicsQuery {
            brand: brand.to_string(),
            limit,
            ttl: None,
        })
    }

    #[tokio::test]
    async fn test_topics_handler_caches() {
        let state = memory_state();

        let first = topics_handler(State(state.clone()), query("BrandX", 5))
            .await
            .unwrap();
        let second = topics_handler(State(state.clone()), query("BrandX", 5))
            .await
            .unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.topics, second.topics);
        assert_eq!(first.topics.len(), 5);
    }

    #[tokio::test]
    async fn test_state_from_config_shares_store() {
        let config = Config {
            store_url: Some(crate::cache::MEMORY_URL.to_string()),
            ..Config::default()
        };
        let state = AppState::from_config(&config);
        assert_eq!(state.store.backend_name(), "memory");

        topics_handler(State(state.clone()), query("BrandX", 2)).await.unwrap();
        let again = topics_handler(State(state.clone()), query("BrandX", 2)).await.unwrap();

        assert!(again.cached);
        assert_eq!(state.reporter.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_topics_handler_degraded() {
        let state = AppState::new(CacheStore::new(Arc::new(NullBackend::new("test")), 300));

        let first = topics_handler(State(state.clone()), query("BrandX", 3))
            .await
            .unwrap();
        let second = topics_handler(State(state), query("BrandX", 3))
            .await
            .unwrap();

        assert!(!first.cached);
        assert!(!second.cached);
        assert_eq!(first.topics, second.topics);
    }

    #[tokio::test]
    async fn test_topics_handler_invalid_request() {
        let state = memory_state();

        let result = topics_handler(State(state), query("", 5)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_delete_handler_invalidates() {
        let state = memory_state();
        topics_handler(State(state.clone()), query("BrandX", 5))
            .await
            .unwrap();

        let request = TopicRequest::new("BrandX", 5);
        let key = crate::cache::CacheKey::build(topics::NAMESPACE, &request.args());
        let result = delete_handler(State(state.clone()), Path(key.to_string())).await;
        assert!(result.is_ok());

        let again = topics_handler(State(state), query("BrandX", 5))
            .await
            .unwrap();
        assert!(!again.cached);
    }

    #[tokio::test]
    async fn test_delete_handler_missing_key() {
        let state = memory_state();

        let result = delete_handler(State(state), Path("nothing-here".to_string())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = memory_state();

        let response = stats_handler(State(state)).await;
        assert!(response.enabled);
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
    }

    #[tokio::test]
    async fn test_stats_handler_without_store() {
        let state = AppState::new(CacheStore::new(Arc::new(NullBackend::new("test")), 300));

        let response = stats_handler(State(state)).await;
        assert!(!response.enabled);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
