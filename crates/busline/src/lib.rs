//! # busline
//!
//! Message bus envelopes carrying arbitrary object graphs as self-describing JSON.
//!
//! busline provides:
//! - A type registry built from a declarative mapping (objects, enums, aliases)
//! - Polymorphic marshalling that preserves cycles and shared references
//! - Envelope framing for batches of messages
//! - An HTTP content adapter for JSON-family media types
//!
//! ## Quick Start
//!
//! ```ignore
//! use busline::prelude::*;
//!
//! let mapping = MappingConfig::from_toml(r#"
//!     [[objects]]
//!     id = "Greeting"
//!     fields = [{ name = "text", type = "string" }]
//! "#)?;
//! let registry = MappingContext::init(&mapping)?;
//! let codec = JsonCodec::new(Marshalling::new(registry));
//!
//! let greeting = ObjectRef::new("Greeting").with_field("text", "hello");
//! let envelope = Envelope::new(Message::new("greetings", greeting).with_reply_to("greetings.reply"));
//!
//! let bytes = codec.encode_envelope(&envelope)?;
//! let decoded = codec.decode_envelope(&bytes)?;
//! assert_eq!(decoded, envelope);
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`busline_core`] - Errors, type descriptors, and configuration
//! - [`busline_marshal`] - Value model, registry, strategies, and graph walker
//! - [`busline_transport`] - Envelopes and the JSON wire codec
//! - [`busline_http`] - HTTP content adapter
//! - [`busline_logging`] - Subscriber setup with a reloadable level

// Re-export core types
pub use busline_core::{
    AliasDeclaration, BusConfig, EnumDeclaration, FieldDeclaration, Instantiation, LogLevel,
    MappingConfig, MarshalError, MarshalResult, ObjectDeclaration, TypeDescriptor, WalkState,
};

// Re-export marshalling
pub use busline_marshal::{
    CollectionKind, CollectionValue, EnumValue, Factory, FieldValues, GraphWalker, MapValue,
    MappingContext, Marshalling, ObjectRef, StackFrame, Strategy, ThrowableValue, TypeRegistry,
    TypeSite, Value, strategy,
};

// Re-export transport
pub use busline_transport::{Codec, CodecError, Envelope, JsonCodec, Message};

// Re-export HTTP adapter
pub use busline_http::{MarshallingProvider, ProviderError, is_json_media_type};

// Re-export logging
pub use busline_logging::{LoggingError, ReloadHandle, init_logging};

// Re-export common dependencies that bus users need
pub use serde_json;
pub use tracing;

/// Prelude module for convenient imports.
///
/// Use `use busline::prelude::*;` to import commonly used types.
///
/// This includes:
/// - Configuration: `BusConfig`, `MappingConfig`
/// - Marshalling: `MappingContext`, `Marshalling`, `TypeRegistry`, `TypeDescriptor`
/// - Values: `Value`, `ObjectRef`, `CollectionValue`, `MapValue`, `EnumValue`
/// - Transport: `Codec`, `JsonCodec`, `Envelope`, `Message`
pub mod prelude {
    // Configuration and errors
    pub use crate::{BusConfig, LogLevel, MappingConfig, MarshalError, MarshalResult};

    // Marshalling
    pub use crate::{MappingContext, Marshalling, TypeDescriptor, TypeRegistry};

    // Value model
    pub use crate::{CollectionValue, EnumValue, MapValue, ObjectRef, ThrowableValue, Value};

    // Transport
    pub use crate::{Codec, CodecError, Envelope, JsonCodec, Message};
}
