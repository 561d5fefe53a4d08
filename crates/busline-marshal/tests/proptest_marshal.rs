//! Property-based tests for marshalling
//!
//! Tests that arbitrary value trees survive a text round trip and that
//! arbitrary JSON never makes the decoder panic.

use busline_marshal::{CollectionValue, MapValue, Marshalling, TypeDescriptor, TypeRegistry, Value};
use proptest::prelude::*;
use std::sync::Arc;

fn marshalling() -> Marshalling {
    Marshalling::new(Arc::new(TypeRegistry::new()))
}

// Strategy: Generate leaf values of every scalar kind
fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        (-1.0e6f32..1.0e6f32).prop_map(Value::Float),
        (-1.0e12f64..1.0e12f64).prop_map(Value::Double),
        any::<char>().prop_map(Value::Char),
        ".{0,20}".prop_map(Value::String),
    ]
}

// Strategy: Generate nested lists, sets, queues and maps of leaves
fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::Collection(CollectionValue::list(items))),
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::Collection(CollectionValue::set(items))),
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::Collection(CollectionValue::queue(items))),
            prop::collection::vec((".{0,8}", inner), 0..6).prop_map(|entries| {
                let mut map = MapValue::new().with_types(TypeDescriptor::String, TypeDescriptor::Any);
                for (k, v) in entries {
                    map.insert(Value::String(k), v);
                }
                Value::Map(map)
            }),
        ]
    })
}

// Strategy: Generate arbitrary JSON documents
fn arb_json() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|i| serde_json::Value::Number(i.into())),
        prop_oneof![
            Just("EncodedType".to_string()),
            Just("list".to_string()),
            Just("^ref".to_string()),
            Just("1".to_string()),
            ".{0,6}"
        ]
        .prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(serde_json::Value::Array),
            prop::collection::vec(
                (
                    prop_oneof![
                        Just("EncodedType".to_string()),
                        Just("Value".to_string()),
                        Just("ObjectID".to_string()),
                        Just("^ref".to_string()),
                        ".{0,6}"
                    ],
                    inner
                ),
                0..5
            )
            .prop_map(|entries| serde_json::Value::Object(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Property: Any value tree survives encode then decode unchanged
    #[test]
    fn proptest_value_roundtrip(value in arb_value()) {
        let marshalling = marshalling();

        let text = marshalling.to_json(&value)
            .expect("Encoding should succeed for builtin shapes");
        let recovered = marshalling.from_json(&text, &TypeDescriptor::Any)
            .expect("Decoding should succeed for encoded text");

        prop_assert_eq!(recovered, value);
    }

    /// Property: Encoding is deterministic
    #[test]
    fn proptest_encoding_deterministic(value in arb_value()) {
        let marshalling = marshalling();

        let first = marshalling.to_json(&value).expect("Encoding should succeed");
        let second = marshalling.to_json(&value).expect("Encoding should succeed");

        prop_assert_eq!(first, second);
    }

    /// Property: Arbitrary JSON decodes or fails cleanly
    #[test]
    fn proptest_arbitrary_json_never_panics(json in arb_json()) {
        let marshalling = marshalling();

        let _ = marshalling.unmarshal(&json, &TypeDescriptor::Any);
    }

    /// Property: Long values keep every digit
    #[test]
    fn proptest_long_exact(n in any::<i64>()) {
        let marshalling = marshalling();
        let value = Value::Long(n);

        let text = marshalling.to_json(&value).expect("Encoding should succeed");
        let recovered = marshalling.from_json(&text, &TypeDescriptor::Any)
            .expect("Decoding should succeed");

        prop_assert_eq!(recovered, value);
    }
}
