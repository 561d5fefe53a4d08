//! busline-transport - Envelope framing and JSON wire codec
//!
//! This crate provides:
//! - [`Message`] and [`Envelope`] for message framing
//! - [`Codec`] trait for encoding/decoding envelopes and bare values
//! - [`JsonCodec`] implementation over a [`busline_marshal::Marshalling`]

mod codec;
mod envelope;

pub use codec::{Codec, CodecError, JsonCodec};
pub use envelope::{Envelope, Message};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Codec, CodecError, Envelope, JsonCodec, Message};
}
