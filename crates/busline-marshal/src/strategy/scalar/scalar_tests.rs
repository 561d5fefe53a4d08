#![allow(non_snake_case)]

use super::*;
use crate::registry::TypeRegistry;
use serde_json::json;
use test_case::test_case;

#[test_case(Value::Bool(true), json!(true) ; "bool")]
#[test_case(Value::Int(-7), json!(-7) ; "int")]
#[test_case(Value::Long(9_007_199_254_740_993), json!("9007199254740993") ; "long as string")]
#[test_case(Value::Float(10.1), json!(10.1) ; "float shortest text")]
#[test_case(Value::Double(f64::INFINITY), json!("Infinity") ; "infinity")]
#[test_case(Value::Double(f64::NEG_INFINITY), json!("-Infinity") ; "negative infinity")]
#[test_case(Value::Float(f32::NAN), json!("NaN") ; "nan")]
#[test_case(Value::Char('x'), json!("x") ; "char")]
#[test_case(Value::from("hi"), json!("hi") ; "string")]
fn encode_literal___writes_expected_json(value: Value, expected: Json) {
    let registry = TypeRegistry::new();
    let walker = GraphWalker::new(&registry);

    assert_eq!(encode_literal(&value, &walker).unwrap(), expected);
}

#[test_case(json!("9007199254740993"), TypeDescriptor::Long, Value::Long(9_007_199_254_740_993) ; "long from string")]
#[test_case(json!(12), TypeDescriptor::Long, Value::Long(12) ; "long from number")]
#[test_case(json!(15.12), TypeDescriptor::Float, Value::Float(15.12) ; "float")]
#[test_case(json!("NaN"), TypeDescriptor::Double, Value::Double(f64::NAN) ; "nan double")]
#[test_case(json!("c"), TypeDescriptor::Char, Value::Char('c') ; "char")]
fn decode_literal___reads_declared_type(literal: Json, declared: TypeDescriptor, expected: Value) {
    let registry = TypeRegistry::new();
    let walker = GraphWalker::new(&registry);

    assert_eq!(decode_literal(&literal, &declared, &walker).unwrap(), expected);
}

#[test_case(json!(3_000_000_000i64), TypeDescriptor::Int ; "int overflow")]
#[test_case(json!("ab"), TypeDescriptor::Char ; "two chars")]
#[test_case(json!(1), TypeDescriptor::String ; "number as string")]
#[test_case(json!("12"), TypeDescriptor::Int ; "string as int")]
#[test_case(json!(1.5), TypeDescriptor::Bool ; "number as bool")]
fn decode_literal___mismatch_is_malformed(literal: Json, declared: TypeDescriptor) {
    let registry = TypeRegistry::new();
    let walker = GraphWalker::new(&registry);

    let result = decode_literal(&literal, &declared, &walker);

    assert!(matches!(result, Err(MarshalError::MalformedWire(_))));
}

#[test]
fn infer_literal___small_integer_is_int_large_is_long() {
    let registry = TypeRegistry::new();
    let walker = GraphWalker::new(&registry);

    assert_eq!(infer_literal(&json!(5), &walker).unwrap(), Value::Int(5));
    assert_eq!(
        infer_literal(&json!(5_000_000_000i64), &walker).unwrap(),
        Value::Long(5_000_000_000)
    );
    assert_eq!(infer_literal(&json!(2.5), &walker).unwrap(), Value::Double(2.5));
}

#[test]
fn Float___round_trip___keeps_bit_pattern() {
    let registry = TypeRegistry::new();
    let walker = GraphWalker::new(&registry);

    for f in [10.1f32, 15.12, 20.345, f32::MIN_POSITIVE, -0.0, f32::MAX] {
        let literal = encode_literal(&Value::Float(f), &walker).unwrap();
        let back = decode_literal(&literal, &TypeDescriptor::Float, &walker).unwrap();

        assert_eq!(back, Value::Float(f), "{f} came back as {back:?}");
    }
}
