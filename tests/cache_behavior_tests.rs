//! Integration Tests for Cache Behavior
//!
//! Exercises key derivation, memoization, expiry and degraded mode through
//! the public API only.

use std::cell::Cell;
use std::sync::Arc;

use memo_cache::cache::{ManualClock, MemoryBackend};
use memo_cache::topics::{generate_topics, TopicRequest};
use memo_cache::{CacheError, CacheKey, CacheStore, CallArgs, Config, Memoizer, StatsReporter};

// == Helper Functions ==

fn memory_store() -> Arc<CacheStore> {
    Arc::new(CacheStore::new(Arc::new(MemoryBackend::new()), 300))
}

/// A store pointed at a Redis URL nothing listens on.
fn unreachable_store() -> Arc<CacheStore> {
    let config = Config {
        store_url: Some("redis://127.0.0.1:1/".to_string()),
        connect_timeout_ms: 200,
        operation_timeout_ms: 200,
        ..Config::default()
    };
    Arc::new(CacheStore::connect(&config))
}

// == Key Derivation ==

#[test]
fn test_scenario_key_is_stable() {
    let args = CallArgs::new().arg("BrandX").named("limit", 5);

    let first = CacheKey::build("topics", &args);
    let second = CacheKey::build("topics", &CallArgs::new().arg("BrandX").named("limit", 5));

    assert_eq!(first, second);
    assert!(first.as_str().starts_with("topics:"));
}

#[test]
fn test_keyword_order_independence() {
    let ab = CallArgs::new().named("a", 1).named("b", 2);
    let ba = CallArgs::new().named("b", 2).named("a", 1);

    assert_eq!(CacheKey::build("ns", &ab), CacheKey::build("ns", &ba));
}

#[test]
fn test_argument_sensitivity() {
    let base = CacheKey::build("ns", &CallArgs::new().named("a", 1));

    assert_ne!(base, CacheKey::build("ns", &CallArgs::new().named("a", 2)));
    assert_ne!(base, CacheKey::build("other", &CallArgs::new().named("a", 1)));
}

// == Memoization ==

#[test]
fn test_memoization_correctness() {
    let memo = Memoizer::new(memory_store());
    let counter = Cell::new(0u32);
    let args = CallArgs::new().arg(1).arg(2);

    let compute = || {
        counter.set(counter.get() + 1);
        Ok::<_, CacheError>(counter.get())
    };

    let first = memo.memoize("ns", Some(60), &args, compute).unwrap();
    let second = memo.memoize("ns", Some(60), &args, compute).unwrap();

    assert_eq!(first, second);
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_failure_isolation() {
    let store = memory_store();
    let memo = Memoizer::new(store.clone());
    let args = CallArgs::new().arg("boom");

    let result: Result<u32, anyhow::Error> =
        memo.memoize("ns", Some(60), &args, || Err(anyhow::anyhow!("generator failed")));

    assert_eq!(result.unwrap_err().to_string(), "generator failed");
    let key = CacheKey::build("ns", &args);
    assert!(store.get::<u32>(key.as_str()).is_none());
}

#[test]
fn test_ttl_expiry_with_manual_clock() {
    let clock = Arc::new(ManualClock::new(0));
    let store = CacheStore::new(Arc::new(MemoryBackend::with_clock(clock.clone())), 300);

    assert!(store.set("short", &"lived", Some(1)).unwrap());
    assert_eq!(store.get::<String>("short").as_deref(), Some("lived"));

    clock.advance_ms(1_001);

    assert!(store.get::<String>("short").is_none());
}

#[test]
fn test_scenario_topic_generation() {
    let memo = Memoizer::new(memory_store());
    let calls = Cell::new(0);
    let args = CallArgs::new().arg("BrandX").named("limit", 5);

    let gen_fn = || {
        calls.set(calls.get() + 1);
        Ok::<_, CacheError>(generate_topics("BrandX", 5))
    };

    let first = memo.memoize("topics", Some(300), &args, gen_fn).unwrap();
    let second = memo.memoize("topics", Some(300), &args, gen_fn).unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
}

#[test]
fn test_computation_trait_shares_entries_with_memoize() {
    let memo = Memoizer::new(memory_store());
    let request = TopicRequest::new("BrandX", 5);

    let via_trait = memo.run(&request).unwrap();
    let via_closure: Vec<String> = memo
        .memoize(
            memo_cache::topics::NAMESPACE,
            None,
            &CallArgs::new().arg("BrandX").named("limit", 5),
            || -> Result<Vec<String>, CacheError> { panic!("should be served from cache") },
        )
        .unwrap();

    assert_eq!(via_trait, via_closure);
}

// == Degraded Mode ==

#[test]
fn test_degraded_mode_transparency() {
    let store = unreachable_store();

    assert!(!store.set("key", &"value", Some(60)).unwrap());
    assert!(store.get::<String>("key").is_none());
    store.delete("key");

    let stats = StatsReporter::new(store).stats();
    assert!(!stats.enabled);
    assert_eq!(stats.backend, "redis");
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.errors, 0);
}

#[test]
fn test_degraded_memoize_always_recomputes() {
    let memo = Memoizer::new(unreachable_store());
    let calls = Cell::new(0);

    for _ in 0..2 {
        let value = memo
            .memoize("ns", Some(60), &CallArgs::new(), || {
                calls.set(calls.get() + 1);
                Ok::<_, CacheError>(42)
            })
            .unwrap();
        assert_eq!(value, 42);
    }

    assert_eq!(calls.get(), 2);
}

#[test]
fn test_disabled_store_is_pass_through() {
    let config = Config {
        store_url: Some(memo_cache::cache::MEMORY_URL.to_string()),
        enabled: false,
        ..Config::default()
    };
    let store = Arc::new(CacheStore::connect(&config));

    assert!(!store.set("key", &1, None).unwrap());
    assert!(store.get::<u32>("key").is_none());
    assert!(!StatsReporter::new(store).stats().enabled);
}

#[tokio::test]
async fn test_async_memoize_degraded() {
    let memo = Memoizer::new(unreachable_store());

    let topics: Vec<String> = memo
        .memoize_async("topics", Some(300), &CallArgs::new().arg("Acme"), || async {
            Ok::<_, CacheError>(generate_topics("Acme", 2))
        })
        .await
        .unwrap();

    assert_eq!(topics.len(), 2);
}
