//! Envelope and message types carried over the bus

use busline_marshal::Value;
use serde::{Deserialize, Serialize};

/// One message addressed to a subject
///
/// The value is an arbitrary marshallable graph; the codec encodes it as a
/// self-describing token.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Destination subject (e.g., "orders.submit")
    pub to_subject: String,

    /// Subject the receiver should answer on, for callback correlation
    pub reply_to: Option<String>,

    /// Command discriminator within the subject
    pub command_type: Option<String>,

    /// Message content
    pub value: Value,
}

impl Message {
    /// Create a message for a subject
    pub fn new(to_subject: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            to_subject: to_subject.into(),
            reply_to: None,
            command_type: None,
            value: value.into(),
        }
    }

    /// Set reply-to subject
    pub fn with_reply_to(mut self, subject: impl Into<String>) -> Self {
        self.reply_to = Some(subject.into());
        self
    }

    /// Set command type
    pub fn with_command_type(mut self, command: impl Into<String>) -> Self {
        self.command_type = Some(command.into());
        self
    }
}

/// Ordered batch of messages sent as one transmission unit
///
/// An envelope always holds at least one message. Insertion order is the
/// delivery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    messages: Vec<Message>,
}

impl Envelope {
    /// Create an envelope holding a single message
    pub fn new(first: Message) -> Self {
        Self {
            messages: vec![first],
        }
    }

    /// Build an envelope from a batch, `None` if the batch is empty
    pub fn from_messages(messages: Vec<Message>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self { messages })
        }
    }

    /// Append a message
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Hand the messages over for dispatch
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true for a constructed envelope
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl IntoIterator for Envelope {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

/// Wire frame of an envelope: `{"MessageParts": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EnvelopeFrame {
    #[serde(rename = "MessageParts")]
    pub message_parts: Vec<MessageFrame>,
}

/// Wire frame of one message, its value already marshalled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MessageFrame {
    #[serde(rename = "ToSubject")]
    pub to_subject: String,

    #[serde(rename = "ReplyTo", default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    #[serde(rename = "CommandType", default, skip_serializing_if = "Option::is_none")]
    pub command_type: Option<String>,

    #[serde(rename = "Value", default)]
    pub value: serde_json::Value,
}
