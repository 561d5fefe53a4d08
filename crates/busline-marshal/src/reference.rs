//! Per-pass reference table preserving object identity

use crate::value::ObjectRef;
use busline_core::{MarshalError, MarshalResult};
use std::collections::HashMap;

/// Identity to wire id bindings for one marshal or unmarshal pass
///
/// Encoding keys by instance address; decoding keys by the wire id string.
/// The table holds the encoded instances alive for the duration of the pass,
/// so an address cannot be reused by a different object mid-pass.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    outbound: HashMap<usize, (String, ObjectRef)>,
    inbound: HashMap<String, ObjectRef>,
    next_id: u64,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire id already assigned to this instance, if any
    pub fn lookup(&self, object: &ObjectRef) -> Option<&str> {
        self.outbound
            .get(&object.identity())
            .map(|(id, _)| id.as_str())
    }

    /// Assign the next wire id to an instance seen for the first time
    pub fn assign(&mut self, object: &ObjectRef) -> String {
        if let Some(id) = self.lookup(object) {
            return id.to_string();
        }
        self.next_id += 1;
        let id = self.next_id.to_string();
        self.outbound
            .insert(object.identity(), (id.clone(), object.clone()));
        id
    }

    /// Bind a wire id to a freshly created instance
    pub fn define(&mut self, id: &str, object: ObjectRef) -> MarshalResult<()> {
        if self.inbound.contains_key(id) {
            return Err(MarshalError::malformed(format!(
                "object id {id} defined twice"
            )));
        }
        self.inbound.insert(id.to_string(), object);
        Ok(())
    }

    /// Instance previously bound to a wire id
    pub fn resolve(&self, id: &str) -> MarshalResult<ObjectRef> {
        self.inbound
            .get(id)
            .cloned()
            .ok_or_else(|| MarshalError::DanglingReference(id.to_string()))
    }

    /// Number of instances bound in either direction
    pub fn len(&self) -> usize {
        self.outbound.len() + self.inbound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
