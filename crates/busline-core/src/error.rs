//! Error types for marshalling passes

use thiserror::Error;

/// Result type alias for marshalling operations
pub type MarshalResult<T> = Result<T, MarshalError>;

/// Error type for marshal/unmarshal passes
///
/// Every variant aborts the whole pass; no partially encoded text or
/// partially decoded graph is ever handed back alongside one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// A runtime value reached during encoding has no resolvable type
    #[error("unsupported type `{type_name}` at `{path}`")]
    UnsupportedType { type_name: String, path: String },

    /// A wire type id has no registered decoder
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A decoded type has neither a default constructor nor a factory
    #[error("type `{0}` cannot be instantiated: no constructor or factory registered")]
    NotInstantiable(String),

    /// An enum name is missing from the decoding side's definition
    #[error("enum `{enum_type}` has no constant named `{constant}`")]
    UnknownEnumConstant { enum_type: String, constant: String },

    /// A back-reference points at an object id that was not yet defined
    #[error("dangling reference: object id {0} used before its definition")]
    DanglingReference(String),

    /// The wire text does not parse as valid tokens
    #[error("malformed wire data: {0}")]
    MalformedWire(String),

    /// A walker was driven from a state that does not allow it
    #[error("invalid walker state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// Mapping or bus configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),
}

impl MarshalError {
    /// Build an [`MarshalError::UnsupportedType`] for the given field path
    pub fn unsupported(type_name: impl Into<String>, path: impl Into<String>) -> Self {
        MarshalError::UnsupportedType {
            type_name: type_name.into(),
            path: path.into(),
        }
    }

    /// Build a [`MarshalError::MalformedWire`]
    pub fn malformed(message: impl Into<String>) -> Self {
        MarshalError::MalformedWire(message.into())
    }

    /// Returns a stable numeric code, used by the HTTP boundary and the CLI exit status
    pub fn error_code(&self) -> u32 {
        match self {
            MarshalError::UnsupportedType { .. } => 1,
            MarshalError::UnknownType(_) => 2,
            MarshalError::NotInstantiable(_) => 3,
            MarshalError::UnknownEnumConstant { .. } => 4,
            MarshalError::DanglingReference(_) => 5,
            MarshalError::MalformedWire(_) => 6,
            MarshalError::InvalidState { .. } => 7,
            MarshalError::Config(_) => 8,
        }
    }

    /// Whether the error was caused by the inbound data rather than the local program
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MarshalError::UnknownType(_)
                | MarshalError::UnknownEnumConstant { .. }
                | MarshalError::DanglingReference(_)
                | MarshalError::MalformedWire(_)
        )
    }
}

impl From<serde_json::Error> for MarshalError {
    fn from(err: serde_json::Error) -> Self {
        MarshalError::MalformedWire(err.to_string())
    }
}
