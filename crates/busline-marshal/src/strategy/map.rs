//! Maps, carried as an array of `[key, value]` pairs so keys keep their type

use super::{
    KEY_TYPE, Strategy, TypeSite, VALUE, VALUE_TYPE, descriptor_member, member, mismatch,
    typed_token,
};
use crate::registry::TypeRegistry;
use crate::value::{MapValue, Value};
use crate::walker::GraphWalker;
use busline_core::{MarshalError, MarshalResult, TypeDescriptor};
use serde_json::{Map, Value as Json};

#[derive(Debug, Default, Clone, Copy)]
pub struct MapStrategy;

impl Strategy for MapStrategy {
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json> {
        let Value::Map(map) = value else {
            return Err(mismatch(site, value, walker));
        };

        let declared = declared_entry_types(walker.registry(), site.declared);
        let key_type = pick([
            declared.as_ref().map(|(k, _)| k.clone()),
            Some(map.key_type().clone()),
            shape_entry_types(site.shape).map(|(k, _)| k),
        ]);
        let value_type = pick([
            declared.map(|(_, v)| v),
            Some(map.value_type().clone()),
            shape_entry_types(site.shape).map(|(_, v)| v),
        ]);

        let mut entries = Vec::with_capacity(map.len());
        for (i, (k, v)) in map.entries().iter().enumerate() {
            let key = walker.encode_element(i, k, &key_type)?;
            let value = walker.encode_element(i, v, &value_type)?;
            entries.push(Json::Array(vec![key, value]));
        }

        let mut token = typed_token(site.encoded);
        token.insert(KEY_TYPE.to_string(), Json::String(key_type.to_string()));
        token.insert(VALUE_TYPE.to_string(), Json::String(value_type.to_string()));
        token.insert(VALUE.to_string(), Json::Array(entries));
        Ok(Json::Object(token))
    }

    fn decode(
        &self,
        token: &Map<String, Json>,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value> {
        let entries = member(token, VALUE)?.as_array().ok_or_else(|| {
            MarshalError::malformed(format!("map at `{}` must carry an array", walker.path()))
        })?;

        let declared = declared_entry_types(walker.registry(), site.declared);
        let key_type = pick([
            declared.as_ref().map(|(k, _)| k.clone()),
            descriptor_member(token, KEY_TYPE)?,
            shape_entry_types(site.shape).map(|(k, _)| k),
        ]);
        let value_type = pick([
            declared.map(|(_, v)| v),
            descriptor_member(token, VALUE_TYPE)?,
            shape_entry_types(site.shape).map(|(_, v)| v),
        ]);

        let mut map = MapValue::new().with_types(key_type.clone(), value_type.clone());
        if let TypeDescriptor::Named(id) = site.encoded {
            map = map.with_type_name(id.clone());
        }
        for (i, entry) in entries.iter().enumerate() {
            let pair = entry.as_array().filter(|pair| pair.len() == 2).ok_or_else(|| {
                MarshalError::malformed(format!(
                    "map entry {i} at `{}` must be a [key, value] pair",
                    walker.path()
                ))
            })?;
            let key = walker.decode_element(i, &pair[0], &key_type)?;
            let value = walker.decode_element(i, &pair[1], &value_type)?;
            // Duplicate keys: the later entry wins
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

fn pick<const N: usize>(candidates: [Option<TypeDescriptor>; N]) -> TypeDescriptor {
    candidates
        .into_iter()
        .flatten()
        .find(|d| !d.is_any())
        .unwrap_or_default()
}

fn shape_entry_types(shape: &TypeDescriptor) -> Option<(TypeDescriptor, TypeDescriptor)> {
    match shape {
        TypeDescriptor::Map(k, v) => Some((k.as_ref().clone(), v.as_ref().clone())),
        _ => None,
    }
}

fn declared_entry_types(
    registry: &TypeRegistry,
    declared: &TypeDescriptor,
) -> Option<(TypeDescriptor, TypeDescriptor)> {
    match declared {
        TypeDescriptor::Named(_) => registry
            .resolve(declared)
            .ok()
            .and_then(|r| shape_entry_types(&r.shape)),
        other => shape_entry_types(other),
    }
}

#[cfg(test)]
#[path = "map/map_tests.rs"]
mod map_tests;
