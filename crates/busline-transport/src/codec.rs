//! Codec trait and JSON implementation

use crate::envelope::{Envelope, EnvelopeFrame, Message, MessageFrame};
use busline_core::BusConfig;
use busline_marshal::{MarshalError, Marshalling, TypeDescriptor, Value};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("message {index}: {source}")]
    Message {
        index: usize,
        #[source]
        source: MarshalError,
    },

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

impl CodecError {
    /// The marshalling failure behind this error, if any
    pub fn marshal_error(&self) -> Option<&MarshalError> {
        match self {
            CodecError::Message { source, .. } => Some(source),
            CodecError::Marshal(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the input bytes were at fault rather than the local value
    pub fn is_input_error(&self) -> bool {
        match self {
            CodecError::Deserialization(_) | CodecError::InvalidFormat(_) => true,
            CodecError::Serialization(_) => false,
            CodecError::Message { source, .. } | CodecError::Marshal(source) => {
                source.is_input_error()
            }
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CodecError::Deserialization(err.to_string())
        } else {
            CodecError::Serialization(err.to_string())
        }
    }
}

impl From<CodecError> for MarshalError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Message { source, .. } | CodecError::Marshal(source) => source,
            other => MarshalError::MalformedWire(other.to_string()),
        }
    }
}

/// Trait for envelope and value encoding
pub trait Codec: Send + Sync {
    /// Encode an envelope to bytes
    fn encode_envelope(&self, envelope: &Envelope) -> Result<Vec<u8>, CodecError>;

    /// Decode bytes to an envelope
    fn decode_envelope(&self, data: &[u8]) -> Result<Envelope, CodecError>;

    /// Encode a bare value expected to be of type `declared`
    fn encode_value(&self, value: &Value, declared: &TypeDescriptor)
    -> Result<Vec<u8>, CodecError>;

    /// Decode a bare value constrained to type `declared`
    fn decode_value(&self, data: &[u8], declared: &TypeDescriptor) -> Result<Value, CodecError>;

    /// Get the content type for this codec
    fn content_type(&self) -> &'static str;
}

/// JSON codec over a [`Marshalling`]
///
/// Every message of an envelope is marshalled in its own pass, so object
/// identity is shared within a message but never across messages.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    /// Whether to pretty-print output (default: false for efficiency)
    pretty: bool,
    marshalling: Marshalling,
}

impl JsonCodec {
    /// Create a new JSON codec
    pub fn new(marshalling: Marshalling) -> Self {
        Self {
            pretty: false,
            marshalling,
        }
    }

    /// Create a JSON codec that pretty-prints output
    pub fn pretty(marshalling: Marshalling) -> Self {
        Self {
            pretty: true,
            marshalling,
        }
    }

    /// Create a JSON codec honoring the `pretty` flag of a configuration
    pub fn from_config(config: &BusConfig, marshalling: Marshalling) -> Self {
        Self {
            pretty: config.pretty,
            marshalling,
        }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    pub fn marshalling(&self) -> &Marshalling {
        &self.marshalling
    }

    /// Encode an envelope directly to a JSON string
    pub fn encode_string(&self, envelope: &Envelope) -> Result<String, CodecError> {
        let frame = self.to_frame(envelope)?;
        if self.pretty {
            serde_json::to_string_pretty(&frame).map_err(Into::into)
        } else {
            serde_json::to_string(&frame).map_err(Into::into)
        }
    }

    /// Decode a JSON string to an envelope
    pub fn decode_str(&self, data: &str) -> Result<Envelope, CodecError> {
        let frame: EnvelopeFrame = serde_json::from_str(data)?;
        self.from_frame(frame)
    }

    fn to_frame(&self, envelope: &Envelope) -> Result<EnvelopeFrame, CodecError> {
        let message_parts = envelope
            .messages()
            .iter()
            .enumerate()
            .map(|(index, message)| -> Result<MessageFrame, CodecError> {
                let value = self
                    .marshalling
                    .marshal(&message.value, &TypeDescriptor::Any)
                    .map_err(|source| CodecError::Message { index, source })?;
                Ok(MessageFrame {
                    to_subject: message.to_subject.clone(),
                    reply_to: message.reply_to.clone(),
                    command_type: message.command_type.clone(),
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(messages = message_parts.len(), "Envelope encoded");
        Ok(EnvelopeFrame { message_parts })
    }

    fn from_frame(&self, frame: EnvelopeFrame) -> Result<Envelope, CodecError> {
        let messages = frame
            .message_parts
            .into_iter()
            .enumerate()
            .map(|(index, part)| -> Result<Message, CodecError> {
                let value = self
                    .marshalling
                    .unmarshal(&part.value, &TypeDescriptor::Any)
                    .map_err(|source| CodecError::Message { index, source })?;
                Ok(Message {
                    to_subject: part.to_subject,
                    reply_to: part.reply_to,
                    command_type: part.command_type,
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let count = messages.len();
        let envelope = Envelope::from_messages(messages)
            .ok_or_else(|| CodecError::InvalidFormat("envelope has no message parts".into()))?;
        debug!(messages = count, "Envelope decoded");
        Ok(envelope)
    }
}

impl Codec for JsonCodec {
    fn encode_envelope(&self, envelope: &Envelope) -> Result<Vec<u8>, CodecError> {
        let frame = self.to_frame(envelope)?;
        if self.pretty {
            serde_json::to_vec_pretty(&frame).map_err(Into::into)
        } else {
            serde_json::to_vec(&frame).map_err(Into::into)
        }
    }

    fn decode_envelope(&self, data: &[u8]) -> Result<Envelope, CodecError> {
        let frame: EnvelopeFrame = serde_json::from_slice(data)?;
        self.from_frame(frame)
    }

    fn encode_value(
        &self,
        value: &Value,
        declared: &TypeDescriptor,
    ) -> Result<Vec<u8>, CodecError> {
        let token = self.marshalling.marshal(value, declared)?;
        if self.pretty {
            serde_json::to_vec_pretty(&token).map_err(Into::into)
        } else {
            serde_json::to_vec(&token).map_err(Into::into)
        }
    }

    fn decode_value(&self, data: &[u8], declared: &TypeDescriptor) -> Result<Value, CodecError> {
        let token: serde_json::Value = serde_json::from_slice(data)?;
        self.marshalling.unmarshal(&token, declared).map_err(Into::into)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

#[cfg(test)]
#[path = "codec/codec_tests.rs"]
mod codec_tests;
