//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a plain HashMap model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{snapshot, CacheEntry, CacheStore, Expiration, Value};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

fn test_store() -> CacheStore {
    CacheStore::new(Some(TEST_DEFAULT_TTL), Duration::ZERO, 0)
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

/// Generates values of every supported kind, including nested lists
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e12f64..1.0e12).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,32}".prop_map(Value::Str),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Value::List)
    })
}

fn expiration_strategy() -> impl Strategy<Value = Expiration> {
    prop_oneof![
        Just(Expiration::Default),
        Just(Expiration::Never),
        (60u64..3600).prop_map(|secs| Expiration::After(Duration::from_secs(secs))),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Add { key: String, value: Value },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Add { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any sequence of operations leaves the store agreeing with a HashMap
    // model, and every individual outcome matches the model's.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let store = test_store();
        let mut model: HashMap<String, Value> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value.clone(), Expiration::Default);
                    model.insert(key, value);
                }
                CacheOp::Add { key, value } => {
                    let result = store.add(key.clone(), value.clone(), Expiration::Default);
                    if model.contains_key(&key) {
                        prop_assert!(matches!(result, Err(CacheError::AlreadyExists(_))));
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(key, value);
                    }
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key);
                    prop_assert_eq!(&got, &model.get(&key).cloned());
                    if got.is_some() {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                }
                CacheOp::Delete { key } => {
                    prop_assert_eq!(store.delete(&key), model.remove(&key).is_some());
                }
            }
        }

        prop_assert_eq!(store.item_count(), model.len());
        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");

        let items = store.items();
        prop_assert_eq!(items.len(), model.len());
        for (key, value) in &model {
            prop_assert_eq!(&items[key].value, value);
        }
    }

    // Set followed by get returns the stored value, whatever the lifetime.
    #[test]
    fn prop_set_then_get(
        key in key_strategy(),
        value in value_strategy(),
        expiration in expiration_strategy()
    ) {
        let store = test_store();
        store.set(key.clone(), value.clone(), expiration);
        prop_assert_eq!(store.get(&key), Some(value));
    }

    // A failed add never changes the stored value.
    #[test]
    fn prop_add_does_not_overwrite(
        key in key_strategy(),
        first in value_strategy(),
        second in value_strategy()
    ) {
        let store = test_store();
        prop_assert!(store.add(key.clone(), first.clone(), Expiration::Never).is_ok());
        prop_assert!(store.add(key.clone(), second, Expiration::Never).is_err());
        prop_assert_eq!(store.get(&key), Some(first));
    }

    // Heterogeneous snapshots decode to exactly what was encoded.
    #[test]
    fn prop_snapshot_preserves_entries(
        entries in prop::collection::hash_map(
            key_strategy(),
            (value_strategy(), prop::option::of(any::<i64>())),
            0..12
        )
    ) {
        let items: HashMap<String, CacheEntry> = entries
            .into_iter()
            .map(|(key, (value, expires_at))| (key, CacheEntry::new(value, expires_at)))
            .collect();

        let decoded = snapshot::decode(&snapshot::encode(&items).unwrap()).unwrap();
        prop_assert_eq!(decoded, items);
    }

    // Chopping any number of bytes off a snapshot is always detected.
    #[test]
    fn prop_truncated_snapshot_is_corrupt(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 1..6),
        cut in 1usize..64
    ) {
        let items: HashMap<String, CacheEntry> = entries
            .into_iter()
            .map(|(key, value)| (key, CacheEntry::new(value, None)))
            .collect();
        let bytes = snapshot::encode(&items).unwrap();
        let keep = bytes.len().saturating_sub(cut);

        let result = snapshot::decode(&bytes[..keep]);
        prop_assert!(matches!(result, Err(CacheError::CorruptData(_))));
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // Once its TTL has elapsed an entry reads as absent, drops out of the
    // snapshot, yet still counts until a sweep removes it.
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        let store = test_store();

        store.set(key.clone(), value.clone(), Duration::from_millis(10).into());
        prop_assert_eq!(store.get(&key), Some(value));

        sleep(Duration::from_millis(25));

        prop_assert!(store.get(&key).is_none(), "Entry should not be found after TTL expires");
        prop_assert!(store.items().is_empty());
        prop_assert_eq!(store.item_count(), 1);

        prop_assert_eq!(store.delete_expired(), 1);
        prop_assert_eq!(store.item_count(), 0);
    }
}

// Concurrent callers on real threads
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // N threads racing to add the same key produce exactly one winner.
    #[test]
    fn prop_concurrent_add_single_winner(callers in 2usize..12, key in key_strategy()) {
        let store = test_store();

        let successes = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..callers)
                .map(|i| {
                    let store = &store;
                    let key = key.clone();
                    scope.spawn(move || store.add(key, i as i64, Expiration::Default).is_ok())
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|won| *won)
                .count()
        });

        prop_assert_eq!(successes, 1);
        prop_assert_eq!(store.item_count(), 1);
    }

    // Readers running alongside writers only ever see whole values that
    // some writer stored.
    #[test]
    fn prop_concurrent_reads_see_complete_values(
        values in prop::collection::vec("[a-z]{8}", 2..6)
    ) {
        let store = test_store();
        store.set("shared", values[0].clone(), Expiration::Never);

        let observed: Vec<Value> = std::thread::scope(|scope| {
            let store = &store;
            for value in &values {
                scope.spawn(move || {
                    for _ in 0..50 {
                        store.set("shared", value.clone(), Expiration::Never);
                    }
                });
            }
            let readers: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || {
                    (0..50).filter_map(|_| store.get("shared")).collect::<Vec<_>>()
                }))
                .collect();
            readers
                .into_iter()
                .flat_map(|reader| reader.join().unwrap())
                .collect()
        });

        prop_assert_eq!(observed.len(), 200, "The key is never absent");
        for value in observed {
            prop_assert!(values.iter().any(|v| Value::from(v.as_str()) == value));
        }
    }
}
