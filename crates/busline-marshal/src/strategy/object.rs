//! Arbitrary objects, field by field through their field tables

use super::{OBJECT_ID, Strategy, TypeSite, VALUE, member, mismatch, typed_token};
use crate::value::{FieldValues, ObjectRef, Value};
use crate::walker::GraphWalker;
use busline_core::{MarshalError, MarshalResult};
use serde_json::{Map, Value as Json};
use tracing::warn;

#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectStrategy;

impl Strategy for ObjectStrategy {
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json> {
        let Value::Object(object) = value else {
            return Err(mismatch(site, value, walker));
        };
        let table = walker.registry().field_table(object.type_id())?;

        // Assigned before the fields so that cycles back to this object become references
        let id = walker.references().assign(object);

        let mut fields = Map::new();
        for field in table.fields() {
            let json = walker.encode_field(&field.name, &field.read(object), &field.declared)?;
            fields.insert(field.name.clone(), json);
        }

        let mut token = typed_token(site.encoded);
        token.insert(OBJECT_ID.to_string(), Json::String(id));
        token.insert(VALUE.to_string(), Json::Object(fields));
        Ok(Json::Object(token))
    }

    fn decode(
        &self,
        token: &Map<String, Json>,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value> {
        let type_id = site.shape.name();
        let object_id = member(token, OBJECT_ID)?.as_str().ok_or_else(|| {
            MarshalError::malformed(format!("`{OBJECT_ID}` must be a string at `{}`", walker.path()))
        })?;
        let payload = member(token, VALUE)?.as_object().ok_or_else(|| {
            MarshalError::malformed(format!(
                "object `{type_id}` at `{}` must carry a field map",
                walker.path()
            ))
        })?;

        let registry = walker.registry();
        // Fail before decoding any field when no instance can be built
        registry.instance_plan(type_id)?;
        let table = registry.field_table(type_id)?;

        // Bound before the fields so that back-references to it resolve
        let object = ObjectRef::new(type_id);
        walker.references().define(object_id, object.clone())?;

        let mut fields = FieldValues::with_capacity(table.len());
        for (name, json) in payload {
            match table.get(name) {
                Some(field) => {
                    let value = walker.decode_field(name, json, &field.declared)?;
                    fields.insert(name.clone(), value);
                }
                None => warn!(type_id, field = %name, path = %walker.path(), "Ignoring field not declared locally"),
            }
        }

        registry.instantiate_into(&object, fields)?;
        Ok(Value::Object(object))
    }
}
