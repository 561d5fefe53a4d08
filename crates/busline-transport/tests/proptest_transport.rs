//! Property-based tests for envelope encoding
//!
//! Tests that envelopes survive an encode/decode cycle with any message
//! metadata and simple values, and that decoding never panics on arbitrary input.

use busline_marshal::{CollectionValue, Marshalling, TypeRegistry, Value};
use busline_transport::{Codec, Envelope, JsonCodec, Message};
use proptest::prelude::*;
use std::sync::Arc;

fn codec() -> JsonCodec {
    JsonCodec::new(Marshalling::new(Arc::new(TypeRegistry::new())))
}

// Strategy: Generate simple self-describing values (builtin types only)
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int),
        any::<i64>().prop_map(Value::Long),
        ".*".prop_map(Value::String),
    ];
    prop_oneof![
        leaf.clone(),
        prop::collection::vec(leaf, 0..8).prop_map(|items| CollectionValue::list(items).into()),
    ]
}

// Strategy: Generate subjects (non-empty dotted names)
fn arb_subject() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9.]{0,31}"
}

// Strategy: Generate messages with optional metadata
fn arb_message() -> impl Strategy<Value = Message> {
    (
        arb_subject(),
        proptest::option::of(arb_subject()),
        proptest::option::of("[A-Z][a-zA-Z]{0,15}"),
        arb_value(),
    )
        .prop_map(|(subject, reply_to, command_type, value)| {
            let mut message = Message::new(subject, value);
            message.reply_to = reply_to;
            message.command_type = command_type;
            message
        })
}

proptest! {
    /// Property: Envelopes round-trip losslessly and keep message order
    #[test]
    fn proptest_envelope_roundtrip(
        first in arb_message(),
        rest in prop::collection::vec(arb_message(), 0..6)
    ) {
        let mut envelope = Envelope::new(first);
        for message in rest {
            envelope.add_message(message);
        }
        let codec = codec();

        let bytes = codec
            .encode_envelope(&envelope)
            .expect("Encoding should succeed for builtin values");
        let recovered = codec
            .decode_envelope(&bytes)
            .expect("Decoding should succeed for encoded data");

        prop_assert_eq!(recovered, envelope);
    }

    /// Property: Decoding arbitrary bytes returns an error or an envelope, never panics
    #[test]
    fn proptest_decode_arbitrary_bytes_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = codec().decode_envelope(&data);
    }

    /// Property: Pretty and compact output decode to the same envelope
    #[test]
    fn proptest_pretty_and_compact_agree(message in arb_message()) {
        let marshalling = Marshalling::new(Arc::new(TypeRegistry::new()));
        let compact = JsonCodec::new(marshalling.clone());
        let pretty = JsonCodec::pretty(marshalling);
        let envelope = Envelope::new(message);

        let from_compact = compact
            .decode_str(&compact.encode_string(&envelope).expect("compact encode"))
            .expect("compact decode");
        let from_pretty = compact
            .decode_str(&pretty.encode_string(&envelope).expect("pretty encode"))
            .expect("pretty decode");

        prop_assert_eq!(from_compact, from_pretty);
    }
}
