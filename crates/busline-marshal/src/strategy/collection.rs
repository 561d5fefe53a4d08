//! Lists, sets and queues, including registered subtypes of them

use super::{ELEMENT_TYPE, Strategy, TypeSite, VALUE, descriptor_member, member, mismatch, typed_token};
use crate::registry::TypeRegistry;
use crate::value::{CollectionKind, CollectionValue, Value};
use crate::walker::GraphWalker;
use busline_core::{MarshalError, MarshalResult, TypeDescriptor};
use serde_json::{Map, Value as Json};

#[derive(Debug, Default, Clone, Copy)]
pub struct CollectionStrategy;

impl Strategy for CollectionStrategy {
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json> {
        let Value::Collection(collection) = value else {
            return Err(mismatch(site, value, walker));
        };

        // The declared slot knows the reified element type best
        let element = [
            declared_element(walker.registry(), site.declared),
            Some(collection.element().clone()),
            site.shape.element().cloned(),
        ]
        .into_iter()
        .flatten()
        .find(|e| !e.is_any())
        .unwrap_or_default();

        let mut items = Vec::with_capacity(collection.len());
        for (i, item) in collection.items().iter().enumerate() {
            items.push(walker.encode_element(i, item, &element)?);
        }

        let mut token = typed_token(site.encoded);
        token.insert(ELEMENT_TYPE.to_string(), Json::String(element.to_string()));
        token.insert(VALUE.to_string(), Json::Array(items));
        Ok(Json::Object(token))
    }

    fn decode(
        &self,
        token: &Map<String, Json>,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value> {
        let kind = CollectionKind::of(site.shape).ok_or_else(|| {
            MarshalError::malformed(format!("`{}` is not a collection type", site.shape))
        })?;
        let items = member(token, VALUE)?.as_array().ok_or_else(|| {
            MarshalError::malformed(format!(
                "collection at `{}` must carry an array",
                walker.path()
            ))
        })?;

        let element = [
            declared_element(walker.registry(), site.declared),
            descriptor_member(token, ELEMENT_TYPE)?,
            site.shape.element().cloned(),
        ]
        .into_iter()
        .flatten()
        .find(|e| !e.is_any())
        .unwrap_or_default();

        let mut collection = CollectionValue::new(kind).with_element(element.clone());
        if let TypeDescriptor::Named(id) = site.encoded {
            collection = collection.with_type_name(id.clone());
        }
        for (i, item) in items.iter().enumerate() {
            let decoded = walker.decode_element(i, item, &element)?;
            collection.push(decoded);
        }
        Ok(Value::Collection(collection))
    }
}

/// Element type of the declared slot, looking through aliases
pub(crate) fn declared_element(
    registry: &TypeRegistry,
    declared: &TypeDescriptor,
) -> Option<TypeDescriptor> {
    match declared {
        TypeDescriptor::Named(_) => registry
            .resolve(declared)
            .ok()
            .and_then(|r| r.shape.element().cloned()),
        other => other.element().cloned(),
    }
}

#[cfg(test)]
#[path = "collection/collection_tests.rs"]
mod collection_tests;
