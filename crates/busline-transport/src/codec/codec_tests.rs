#![allow(non_snake_case)]

use super::*;
use busline_core::{FieldDeclaration, Instantiation, ObjectDeclaration};
use busline_marshal::{CollectionValue, ObjectRef, TypeRegistry};
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

fn marshalling() -> Marshalling {
    let registry = TypeRegistry::new();
    registry
        .register_object(ObjectDeclaration {
            id: "Node".into(),
            fields: vec![
                FieldDeclaration::new("label", TypeDescriptor::String),
                FieldDeclaration::new("next", TypeDescriptor::named("Node")),
            ],
            instantiation: Instantiation::Default,
            extends: None,
        })
        .unwrap();
    Marshalling::new(Arc::new(registry))
}

fn sample() -> Envelope {
    Envelope::new(
        Message::new("orders.submit", CollectionValue::list([10, 15, 20]))
            .with_reply_to("orders.reply.1")
            .with_command_type("Create"),
    )
    .with_message(Message::new("audit", "submitted"))
}

// JsonCodec tests

#[test]
fn JsonCodec___encode_decode___roundtrip_preserves_data() {
    let codec = JsonCodec::new(marshalling());
    let original = sample();

    let encoded = codec.encode_envelope(&original).unwrap();
    let decoded = codec.decode_envelope(&encoded).unwrap();

    assert_eq!(original, decoded);
}

#[test]
fn JsonCodec___encode_string___outer_object_is_message_parts() {
    let codec = JsonCodec::new(marshalling());

    let encoded = codec.encode_string(&sample()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&encoded).unwrap();

    let parts = json["MessageParts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["ToSubject"], json!("orders.submit"));
    assert_eq!(parts[0]["ReplyTo"], json!("orders.reply.1"));
    assert_eq!(parts[0]["CommandType"], json!("Create"));
    assert_eq!(parts[1]["ToSubject"], json!("audit"));
    assert!(parts[1].get("ReplyTo").is_none());
}

#[test]
fn JsonCodec___encode_string___single_message_still_framed() {
    let codec = JsonCodec::new(marshalling());

    let encoded = codec
        .encode_string(&Envelope::new(Message::new("a", true)))
        .unwrap();

    assert!(encoded.starts_with(r#"{"MessageParts":["#));
}

#[test]
fn JsonCodec___encode_envelope___each_message_is_its_own_pass() {
    let codec = JsonCodec::new(marshalling());
    let node = ObjectRef::new("Node").with_field("label", "shared");
    let envelope =
        Envelope::new(Message::new("a", node.clone())).with_message(Message::new("b", node));

    let encoded = codec.encode_string(&envelope).unwrap();
    let json: serde_json::Value = serde_json::from_str(&encoded).unwrap();

    assert_eq!(json["MessageParts"][0]["Value"]["ObjectID"], json!("1"));
    assert_eq!(json["MessageParts"][1]["Value"]["ObjectID"], json!("1"));
    assert_eq!(json["MessageParts"][1]["Value"]["Value"]["label"], json!("shared"));
}

#[test]
fn JsonCodec___decode_envelope___cycle_within_message_is_restored() {
    let codec = JsonCodec::new(marshalling());
    let node = ObjectRef::new("Node").with_field("label", "loop");
    node.set("next", node.clone());

    let encoded = codec
        .encode_envelope(&Envelope::new(Message::new("a", node)))
        .unwrap();
    let decoded = codec.decode_envelope(&encoded).unwrap();

    let back = decoded.messages()[0].value.as_object().unwrap().clone();
    let next = back.get("next").unwrap();
    assert!(next.as_object().unwrap().ptr_eq(&back));
}

#[test]
fn JsonCodec___pretty___output_contains_newlines() {
    let codec = JsonCodec::pretty(marshalling());

    let encoded = codec.encode_string(&sample()).unwrap();

    assert!(encoded.contains('\n'));
}

#[test]
fn JsonCodec___new___output_is_compact() {
    let codec = JsonCodec::new(marshalling());

    let encoded = codec.encode_string(&sample()).unwrap();

    assert!(!encoded.contains('\n'));
}

#[test]
fn JsonCodec___from_config___honors_pretty_flag() {
    let config = BusConfig {
        pretty: true,
        ..BusConfig::default()
    };

    let codec = JsonCodec::from_config(&config, marshalling());

    assert!(codec.is_pretty());
}

#[test_case("invalid json" ; "not json")]
#[test_case("" ; "empty input")]
#[test_case(r#"{"Parts":[]}"# ; "missing message parts")]
#[test_case(r#"{"MessageParts":[{"ToSubject":"a","Value":1}"# ; "unterminated parts")]
#[test_case(r#"{"MessageParts":[{"ToSubject":"a","Val"# ; "cut inside a key")]
#[test_case(r#"{"MessageParts":[{"Value":1}]}"# ; "missing subject")]
fn JsonCodec___decode___unreadable_envelope_is_deserialization_error(data: &str) {
    let codec = JsonCodec::new(marshalling());

    let err = codec.decode_str(data).unwrap_err();

    assert!(matches!(err, CodecError::Deserialization(_)), "{err:?}");
    assert!(err.is_input_error());
    assert!(matches!(MarshalError::from(err), MarshalError::MalformedWire(_)));
}

#[test]
fn JsonCodec___decode___truncated_envelope_is_malformed_wire() {
    let codec = JsonCodec::new(marshalling());
    let data = codec.encode_envelope(&sample()).unwrap();

    for cut in [1, data.len() / 2, data.len() - 1] {
        let err = codec.decode_envelope(&data[..cut]).unwrap_err();

        assert!(err.is_input_error(), "cut at {cut} gave {err:?}");
        assert!(matches!(MarshalError::from(err), MarshalError::MalformedWire(_)));
    }
}

#[test]
fn JsonCodec___decode___empty_message_parts_is_invalid_format() {
    let codec = JsonCodec::new(marshalling());

    let result = codec.decode_str(r#"{"MessageParts":[]}"#);

    let err = result.unwrap_err();
    assert!(matches!(err, CodecError::InvalidFormat(_)));
    assert!(matches!(MarshalError::from(err), MarshalError::MalformedWire(_)));
}

#[test]
fn JsonCodec___decode___bad_value_reports_message_index() {
    let codec = JsonCodec::new(marshalling());
    let data = r#"{"MessageParts":[
        {"ToSubject":"a","Value":1},
        {"ToSubject":"b","Value":{"EncodedType":"NoSuchType","Value":{}}}
    ]}"#;

    let err = codec.decode_str(data).unwrap_err();

    match err {
        CodecError::Message { index, ref source } => {
            assert_eq!(index, 1);
            assert!(matches!(source, MarshalError::UnknownType(_)));
        }
        other => panic!("expected Message error, got {other:?}"),
    }
}

#[test]
fn JsonCodec___encode___unsupported_value_is_not_input_error() {
    let codec = JsonCodec::new(marshalling());
    let envelope = Envelope::new(Message::new("a", ObjectRef::new("Unregistered")));

    let err = codec.encode_envelope(&envelope).unwrap_err();

    assert!(!err.is_input_error());
    assert!(matches!(
        err.marshal_error(),
        Some(MarshalError::UnsupportedType { .. })
    ));
}

#[test]
fn JsonCodec___value___declared_scalar_is_bare_literal() {
    let codec = JsonCodec::new(marshalling());

    let encoded = codec
        .encode_value(&Value::Int(7), &TypeDescriptor::Int)
        .unwrap();
    let decoded = codec.decode_value(&encoded, &TypeDescriptor::Int).unwrap();

    assert_eq!(encoded, b"7");
    assert_eq!(decoded, Value::Int(7));
}

#[test]
fn JsonCodec___content_type___is_application_json() {
    let codec = JsonCodec::new(marshalling());

    assert_eq!(codec.content_type(), "application/json");
}

// CodecError tests

#[test]
fn CodecError___from_serde_error___syntax_is_deserialization() {
    let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

    let codec_err = CodecError::from(err);

    assert!(matches!(codec_err, CodecError::Deserialization(_)));
    assert!(codec_err.is_input_error());
}

#[test]
fn CodecError___into_marshal_error___unwraps_marshal_failure() {
    let err = CodecError::Message {
        index: 0,
        source: MarshalError::DanglingReference("3".into()),
    };

    let marshal_err: MarshalError = err.into();

    assert!(matches!(marshal_err, MarshalError::DanglingReference(_)));
}
