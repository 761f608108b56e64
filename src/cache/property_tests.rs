//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation and store semantics over generated inputs.

use proptest::prelude::*;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::{CacheKey, CacheStore, CallArgs, Clock, ManualClock, MemoryBackend};

// == Test Configuration ==
const TEST_DEFAULT_TTL: u64 = 300;

// == Strategies ==
/// Generates namespaces as callers use them
fn namespace_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,24}"
}

/// Generates JSON values: scalars, arrays and string-keyed objects, nested
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn named_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map("[a-z]{1,8}", json_strategy(), 0..5)
        .prop_map(|m| m.into_iter().collect())
}

fn build_args(positional: &[Value], named: &[(String, Value)]) -> CallArgs {
    let args = positional
        .iter()
        .cloned()
        .fold(CallArgs::new(), |args, v| args.arg(v));
    named
        .iter()
        .cloned()
        .fold(args, |args, (k, v)| args.named(k, v))
}

/// Generates a sequence of store operations for testing
#[derive(Debug, Clone)]
enum StoreOp {
    Set { key: String, value: i64, ttl: u64 },
    Get { key: String },
    Delete { key: String },
    Advance { secs: u64 },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    let key = "[a-c]{1,2}";
    prop_oneof![
        (key, any::<i64>(), 1u64..5).prop_map(|(key, value, ttl)| StoreOp::Set { key, value, ttl }),
        key.prop_map(|key| StoreOp::Get { key }),
        key.prop_map(|key| StoreOp::Delete { key }),
        (0u64..4).prop_map(|secs| StoreOp::Advance { secs }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Building twice from equal inputs yields the same key.
    #[test]
    fn prop_key_deterministic(
        ns in namespace_strategy(),
        positional in prop::collection::vec(json_strategy(), 0..4),
        named in named_strategy(),
    ) {
        let first = CacheKey::build(&ns, &build_args(&positional, &named));
        let second = CacheKey::build(&ns, &build_args(&positional, &named));
        prop_assert_eq!(first, second);
    }

    // Named argument insertion order never reaches the key.
    #[test]
    fn prop_key_named_order_independent(
        ns in namespace_strategy(),
        named in named_strategy(),
    ) {
        let mut reversed = named.clone();
        reversed.reverse();

        let forward = CacheKey::build(&ns, &build_args(&[], &named));
        let backward = CacheKey::build(&ns, &build_args(&[], &reversed));
        prop_assert_eq!(forward, backward);
    }

    // Changing the namespace or a positional value changes the key.
    #[test]
    fn prop_key_sensitive(
        ns in namespace_strategy(),
        other_ns in namespace_strategy(),
        a in json_strategy(),
        b in json_strategy(),
    ) {
        let base = CacheKey::build(&ns, &CallArgs::new().arg(a.clone()));
        if ns != other_ns {
            prop_assert_ne!(&base, &CacheKey::build(&other_ns, &CallArgs::new().arg(a.clone())));
        }
        if a != b {
            prop_assert_ne!(&base, &CacheKey::build(&ns, &CallArgs::new().arg(b)));
        }
        let prefix = format!("{}:", ns);
        prop_assert!(base.as_str().starts_with(&prefix));
    }

    // A store over the memory backend agrees with a simple model that
    // tracks values and expiry times.
    #[test]
    fn prop_store_matches_model(ops in prop::collection::vec(store_op_strategy(), 1..60)) {
        let clock = Arc::new(ManualClock::new(0));
        let backend = Arc::new(MemoryBackend::with_clock(clock.clone()));
        let store = CacheStore::new(backend, TEST_DEFAULT_TTL);
        let mut model: std::collections::HashMap<String, (i64, u64)> = Default::default();
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match op {
                StoreOp::Set { key, value, ttl } => {
                    prop_assert!(store.set(&key, &value, Some(ttl)).unwrap());
                    model.insert(key, (value, clock.now_ms() + ttl * 1000));
                }
                StoreOp::Get { key } => {
                    let now = clock.now_ms();
                    let expected = model
                        .get(&key)
                        .filter(|(_, expires)| now < *expires)
                        .map(|(v, _)| *v);
                    match expected {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                    prop_assert_eq!(store.get::<i64>(&key), expected);
                }
                StoreOp::Delete { key } => {
                    store.delete(&key);
                    model.remove(&key);
                }
                StoreOp::Advance { secs } => clock.advance_secs(secs),
            }
        }

        prop_assert_eq!(store.counters().hits(), expected_hits);
        prop_assert_eq!(store.counters().misses(), expected_misses);
    }
}
