#![allow(non_snake_case)]

use super::*;
use crate::registry::TypeRegistry;
use busline_core::TypeDescriptor;

fn sample() -> ThrowableValue {
    ThrowableValue::new("Throwable", Some("foo".into()))
        .with_cause(ThrowableValue::new("Throwable", Some("bar".into())))
        .with_stack_trace(vec![
            StackFrame::new("DogClass", "bark", "DogoClass.java", 10),
            StackFrame::new("KatClass", "meow", "KatClass.java", 43),
            StackFrame::new("PigClass", "oink", "PigClass.java", 23),
        ])
}

#[test]
fn ThrowableStrategy___encode___payload_shape() {
    let registry = TypeRegistry::new();

    let token = GraphWalker::new(&registry)
        .marshal(&Value::Throwable(sample()), &TypeDescriptor::Throwable)
        .unwrap();

    assert_eq!(token["EncodedType"], json!("throwable"));
    assert_eq!(token["Value"]["Message"], json!("foo"));
    assert_eq!(token["Value"]["Cause"]["Message"], json!("bar"));
    assert_eq!(token["Value"]["Cause"]["Cause"], Json::Null);
    assert_eq!(
        token["Value"]["StackTrace"][1],
        json!({"DeclaringClass": "KatClass", "MethodName": "meow", "FileName": "KatClass.java", "LineNumber": 43})
    );
}

#[test]
fn ThrowableStrategy___round_trip___equal_field_for_field() {
    let registry = TypeRegistry::new();
    let value = Value::Throwable(sample());

    let token = GraphWalker::new(&registry)
        .marshal(&value, &TypeDescriptor::Any)
        .unwrap();
    let back = GraphWalker::new(&registry)
        .unmarshal(&token, &TypeDescriptor::Any)
        .unwrap();

    assert_eq!(back, value);
    let error = back.as_throwable().unwrap();
    assert_eq!(error.stack_trace().len(), 3);
    assert_eq!(error.chain_len(), 2);
}

#[test]
fn ThrowableStrategy___round_trip___no_message_no_frames() {
    let registry = TypeRegistry::new();
    let value = Value::Throwable(ThrowableValue::new("AssertionError", None));

    let token = GraphWalker::new(&registry)
        .marshal(&value, &TypeDescriptor::Any)
        .unwrap();
    let back = GraphWalker::new(&registry)
        .unmarshal(&token, &TypeDescriptor::Any)
        .unwrap();

    assert_eq!(back, value);
}

#[test]
fn ThrowableStrategy___decode___missing_error_type_is_malformed() {
    let registry = TypeRegistry::new();
    let token = json!({"EncodedType": "throwable", "Value": {"Message": "x"}});

    let result = GraphWalker::new(&registry).unmarshal(&token, &TypeDescriptor::Any);

    assert!(matches!(result, Err(MarshalError::MalformedWire(_))));
}

#[test]
fn ThrowableStrategy___decode___frame_without_line_uses_minus_one() {
    let registry = TypeRegistry::new();
    let token = json!({
        "EncodedType": "throwable",
        "Value": {
            "ErrorType": "Error",
            "StackTrace": [{"DeclaringClass": "A", "MethodName": "b"}]
        }
    });

    let back = GraphWalker::new(&registry)
        .unmarshal(&token, &TypeDescriptor::Any)
        .unwrap();

    let frame = &back.as_throwable().unwrap().stack_trace()[0];
    assert_eq!(frame.line_number, -1);
    assert_eq!(frame.file_name, None);
}

#[test]
fn ThrowableStrategy___decode___nested_cause_error_names_cause_path() {
    let registry = TypeRegistry::new();
    let token = json!({
        "EncodedType": "throwable",
        "Value": {
            "ErrorType": "Outer",
            "Cause": {"ErrorType": "Middle", "Cause": {"Message": "lost its type"}}
        }
    });

    let result = GraphWalker::new(&registry).unmarshal(&token, &TypeDescriptor::Any);

    match result {
        Err(MarshalError::MalformedWire(message)) => {
            assert!(message.contains("throwable.Cause.Cause"), "{message}");
        }
        other => panic!("expected malformed wire, got {other:?}"),
    }
}

#[test]
fn ThrowableStrategy___decode___bad_frame_in_cause_names_cause_path() {
    let registry = TypeRegistry::new();
    let token = json!({
        "EncodedType": "throwable",
        "Value": {
            "ErrorType": "Outer",
            "Cause": {"ErrorType": "Inner", "StackTrace": [{"MethodName": "run"}]}
        }
    });

    let result = GraphWalker::new(&registry).unmarshal(&token, &TypeDescriptor::Any);

    match result {
        Err(MarshalError::MalformedWire(message)) => {
            assert!(message.contains("DeclaringClass"), "{message}");
            assert!(message.contains("throwable.Cause"), "{message}");
        }
        other => panic!("expected malformed wire, got {other:?}"),
    }
}
