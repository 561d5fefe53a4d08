#![allow(non_snake_case)]

use super::*;
use serde_json::json;

fn registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry
        .register_alias("CustomList", TypeDescriptor::list(TypeDescriptor::String))
        .unwrap();
    registry
}

fn marshal(registry: &TypeRegistry, value: &Value, declared: &TypeDescriptor) -> Json {
    GraphWalker::new(registry).marshal(value, declared).unwrap()
}

fn unmarshal(registry: &TypeRegistry, token: &Json, declared: &TypeDescriptor) -> MarshalResult<Value> {
    GraphWalker::new(registry).unmarshal(token, declared)
}

#[test]
fn CollectionStrategy___encode___typed_elements_are_bare_literals() {
    let registry = registry();
    let value = Value::Collection(
        CollectionValue::list([10i64, 15, 20]).with_element(TypeDescriptor::Long),
    );

    let token = marshal(&registry, &value, &TypeDescriptor::Any);

    assert_eq!(
        token,
        json!({"EncodedType": "list", "ElementType": "long", "Value": ["10", "15", "20"]})
    );
}

#[test]
fn CollectionStrategy___encode___untyped_elements_are_typed_tokens() {
    let registry = registry();
    let value = Value::Collection(CollectionValue::list([Value::Int(1), Value::from("a")]));

    let token = marshal(&registry, &value, &TypeDescriptor::Any);

    assert_eq!(
        token,
        json!({
            "EncodedType": "list",
            "ElementType": "any",
            "Value": [
                {"EncodedType": "int", "Value": 1},
                {"EncodedType": "string", "Value": "a"}
            ]
        })
    );
}

#[test]
fn CollectionStrategy___encode___declared_element_type_wins() {
    let registry = registry();
    let value = Value::Collection(CollectionValue::list([1i32, 2]));

    let token = marshal(&registry, &value, &TypeDescriptor::list(TypeDescriptor::Int));

    assert_eq!(token["ElementType"], json!("int"));
    assert_eq!(token["Value"], json!([1, 2]));
}

#[test]
fn CollectionStrategy___encode___wrong_element_type_names_path() {
    let registry = registry();
    let value = Value::Collection(CollectionValue::list([Value::Int(1), Value::from("x")]));

    let result = GraphWalker::new(&registry)
        .marshal(&value, &TypeDescriptor::list(TypeDescriptor::Int));

    match result {
        Err(MarshalError::UnsupportedType { path, .. }) => assert_eq!(path, "list[1]"),
        other => panic!("expected UnsupportedType, got {other:?}"),
    }
}

#[test]
fn CollectionStrategy___round_trip___alias_keeps_type_name_and_items() {
    let registry = registry();
    let value = Value::Collection(
        CollectionValue::list(["one", "two", "three"]).with_type_name("CustomList"),
    );

    let token = marshal(&registry, &value, &TypeDescriptor::Any);
    let back = unmarshal(&registry, &token, &TypeDescriptor::Any).unwrap();

    assert_eq!(token["EncodedType"], json!("CustomList"));
    assert_eq!(token["ElementType"], json!("string"));
    assert_eq!(back, value);
    assert_eq!(back.as_collection().and_then(|c| c.type_name()), Some("CustomList"));
}

#[test]
fn CollectionStrategy___decode___set_deduplicates() {
    let registry = registry();
    let token = json!({"EncodedType": "set", "ElementType": "string", "Value": ["foo", "bar", "foo"]});

    let back = unmarshal(&registry, &token, &TypeDescriptor::Any).unwrap();

    assert_eq!(back.as_collection().map(|c| c.len()), Some(2));
}

#[test]
fn CollectionStrategy___decode___queue_preserves_order() {
    let registry = registry();
    let token = json!({"EncodedType": "queue", "ElementType": "string", "Value": ["test1", "test2", "test3"]});

    let back = unmarshal(&registry, &token, &TypeDescriptor::Any).unwrap();

    assert_eq!(
        back,
        Value::Collection(CollectionValue::queue(["test1", "test2", "test3"]))
    );
}

#[test]
fn CollectionStrategy___decode___non_array_payload_is_malformed() {
    let registry = registry();
    let token = json!({"EncodedType": "list", "Value": {"a": 1}});

    assert!(matches!(
        unmarshal(&registry, &token, &TypeDescriptor::Any),
        Err(MarshalError::MalformedWire(_))
    ));
}

#[test]
fn CollectionStrategy___decode___set_where_list_declared_is_malformed() {
    let registry = registry();
    let token = json!({"EncodedType": "set", "Value": []});

    assert!(matches!(
        unmarshal(&registry, &token, &TypeDescriptor::list(TypeDescriptor::Any)),
        Err(MarshalError::MalformedWire(_))
    ));
}

#[test]
fn declared_element___looks_through_alias() {
    let registry = registry();

    assert_eq!(
        declared_element(&registry, &TypeDescriptor::named("CustomList")),
        Some(TypeDescriptor::String)
    );
    assert_eq!(declared_element(&registry, &TypeDescriptor::Int), None);
}
