//! Entry points for whole-value marshalling

use crate::context::MappingContext;
use crate::registry::TypeRegistry;
use crate::value::Value;
use crate::walker::GraphWalker;
use busline_core::{MarshalResult, TypeDescriptor};
use serde_json::Value as Json;
use std::sync::Arc;

/// Marshaller bound to a registry
///
/// Every call runs a fresh [`GraphWalker`], so one `Marshalling` can serve
/// any number of threads.
#[derive(Debug, Clone)]
pub struct Marshalling {
    registry: Arc<TypeRegistry>,
}

impl Marshalling {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Marshaller over the process-wide registry
    pub fn global() -> MarshalResult<Self> {
        MappingContext::global().map(Self::new)
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Whether values of this type can be marshalled
    pub fn can_handle(&self, desc: &TypeDescriptor) -> bool {
        self.registry.can_handle(desc)
    }

    /// Encode a value expected to be of type `declared` into a token tree
    pub fn marshal(&self, value: &Value, declared: &TypeDescriptor) -> MarshalResult<Json> {
        GraphWalker::new(&self.registry).marshal(value, declared)
    }

    /// Decode a token tree into a value of type `declared`
    pub fn unmarshal(&self, token: &Json, declared: &TypeDescriptor) -> MarshalResult<Value> {
        GraphWalker::new(&self.registry).unmarshal(token, declared)
    }

    /// Encode a self-describing value to JSON text
    pub fn to_json(&self, value: &Value) -> MarshalResult<String> {
        let token = self.marshal(value, &TypeDescriptor::Any)?;
        Ok(serde_json::to_string(&token)?)
    }

    /// Decode JSON text into a value of type `declared`
    pub fn from_json(&self, text: &str, declared: &TypeDescriptor) -> MarshalResult<Value> {
        let token: Json = serde_json::from_str(text)?;
        self.unmarshal(&token, declared)
    }
}
