//! Per-shape encoders and decoders
//!
//! Every typed token on the wire is a JSON object:
//!
//! ```text
//! {"EncodedType": "<type>", "ObjectID"?: "<id>", "Value": <payload>, ...}
//! ```
//!
//! Strategies build and read the whole token; the walker only handles
//! nulls, bare scalar literals and back-references.

mod collection;
mod enumeration;
mod map;
mod numeric;
mod object;
pub(crate) mod scalar;
mod temporal;
mod throwable;

pub use collection::CollectionStrategy;
pub use enumeration::EnumStrategy;
pub use map::MapStrategy;
pub use numeric::BigNumberStrategy;
pub use object::ObjectStrategy;
pub use scalar::ScalarStrategy;
pub use temporal::TemporalStrategy;
pub use throwable::ThrowableStrategy;

use crate::value::Value;
use crate::walker::GraphWalker;
use busline_core::{MarshalError, MarshalResult, TypeDescriptor};
use serde_json::{Map, Value as Json};

pub const ENCODED_TYPE: &str = "EncodedType";
pub const OBJECT_ID: &str = "ObjectID";
pub const VALUE: &str = "Value";
pub const ELEMENT_TYPE: &str = "ElementType";
pub const KEY_TYPE: &str = "KeyType";
pub const VALUE_TYPE: &str = "ValueType";
pub const NANOS: &str = "Nanos";
pub const REF: &str = "^ref";

/// Where a value sits in the type system during one encode or decode step
#[derive(Debug, Clone, Copy)]
pub struct TypeSite<'a> {
    /// Type written as (or read from) `EncodedType`
    pub encoded: &'a TypeDescriptor,
    /// Builtin shape the encoded type resolves to; an alias resolves to its container
    pub shape: &'a TypeDescriptor,
    /// Type expected by the enclosing field, element slot, or caller
    pub declared: &'a TypeDescriptor,
}

/// Encoder/decoder pair for one family of shapes
///
/// Implementations must be stateless across passes; per-pass state lives in
/// the [`GraphWalker`].
pub trait Strategy: Send + Sync {
    /// Produce the typed token for `value`
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json>;

    /// Rebuild a value from a typed token
    fn decode(
        &self,
        token: &Map<String, Json>,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value>;
}

/// Start a typed token carrying `EncodedType`
pub fn typed_token(encoded: &TypeDescriptor) -> Map<String, Json> {
    let mut token = Map::new();
    token.insert(ENCODED_TYPE.to_string(), Json::String(encoded.name().to_string()));
    token
}

/// Required member of a typed token
pub fn member<'t>(token: &'t Map<String, Json>, key: &str) -> MarshalResult<&'t Json> {
    token
        .get(key)
        .ok_or_else(|| MarshalError::malformed(format!("typed token is missing `{key}`")))
}

/// Optional descriptor member such as `ElementType`
pub fn descriptor_member(
    token: &Map<String, Json>,
    key: &str,
) -> MarshalResult<Option<TypeDescriptor>> {
    match token.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(text)) => text.parse().map(Some),
        Some(other) => Err(MarshalError::malformed(format!(
            "`{key}` must be a type string, got {other}"
        ))),
    }
}

/// Error for a value handed to a strategy that does not handle its variant
pub(crate) fn mismatch(site: &TypeSite<'_>, value: &Value, walker: &GraphWalker<'_>) -> MarshalError {
    MarshalError::unsupported(
        format!("{} as {}", value.descriptor(), site.encoded),
        walker.path(),
    )
}
