#![allow(non_snake_case)]

use super::*;
use serde_json::json;

fn string_to_int() -> TypeDescriptor {
    TypeDescriptor::map(TypeDescriptor::String, TypeDescriptor::Int)
}

#[test]
fn MapStrategy___encode___writes_typed_pairs() {
    let registry = TypeRegistry::new();
    let value = Value::Map(MapValue::new().with_entry("a", 1i32).with_entry("b", 2i32));

    let token = GraphWalker::new(&registry)
        .marshal(&value, &string_to_int())
        .unwrap();

    assert_eq!(
        token,
        json!({
            "EncodedType": "map",
            "KeyType": "string",
            "ValueType": "int",
            "Value": [["a", 1], ["b", 2]]
        })
    );
}

#[test]
fn MapStrategy___round_trip___non_string_keys() {
    let registry = TypeRegistry::new();
    let value = Value::Map(
        MapValue::new()
            .with_types(TypeDescriptor::Long, TypeDescriptor::Any)
            .with_entry(7i64, "seven")
            .with_entry(8i64, Value::Null),
    );

    let token = GraphWalker::new(&registry)
        .marshal(&value, &TypeDescriptor::Any)
        .unwrap();
    let back = GraphWalker::new(&registry)
        .unmarshal(&token, &TypeDescriptor::Any)
        .unwrap();

    assert_eq!(back, value);
}

#[test]
fn MapStrategy___decode___duplicate_key_last_write_wins() {
    let registry = TypeRegistry::new();
    let token = json!({
        "EncodedType": "map",
        "KeyType": "string",
        "ValueType": "int",
        "Value": [["k", 1], ["k", 2]]
    });

    let back = GraphWalker::new(&registry)
        .unmarshal(&token, &TypeDescriptor::Any)
        .unwrap();

    let map = back.as_map().unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&Value::from("k")), Some(&Value::Int(2)));
}

#[test]
fn MapStrategy___decode___entry_that_is_not_a_pair_is_malformed() {
    let registry = TypeRegistry::new();
    let token = json!({"EncodedType": "map", "Value": [["k"]]});

    let result = GraphWalker::new(&registry).unmarshal(&token, &TypeDescriptor::Any);

    assert!(matches!(result, Err(MarshalError::MalformedWire(_))));
}

#[test]
fn MapStrategy___decode___alias_records_type_name() {
    let registry = TypeRegistry::new();
    registry.register_alias("Scores", string_to_int()).unwrap();
    let token = json!({"EncodedType": "Scores", "Value": [["ann", 3]]});

    let back = GraphWalker::new(&registry)
        .unmarshal(&token, &TypeDescriptor::Any)
        .unwrap();

    let map = back.as_map().unwrap();
    assert_eq!(map.type_name(), Some("Scores"));
    assert_eq!(map.get(&Value::from("ann")), Some(&Value::Int(3)));
}
