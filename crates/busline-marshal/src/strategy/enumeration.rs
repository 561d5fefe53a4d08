//! Enums, carried by constant name

use super::{Strategy, TypeSite, VALUE, member, mismatch, typed_token};
use crate::registry::TypeDefinition;
use crate::value::{EnumValue, Value};
use crate::walker::GraphWalker;
use busline_core::{MarshalError, MarshalResult};
use serde_json::{Map, Value as Json};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct EnumStrategy;

impl Strategy for EnumStrategy {
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json> {
        let Value::Enum(constant) = value else {
            return Err(mismatch(site, value, walker));
        };
        let mut token = typed_token(site.encoded);
        token.insert(VALUE.to_string(), Json::String(constant.constant().to_string()));
        Ok(Json::Object(token))
    }

    fn decode(
        &self,
        token: &Map<String, Json>,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value> {
        let enum_type = site.shape.name();
        let constant = member(token, VALUE)?.as_str().ok_or_else(|| {
            MarshalError::malformed(format!(
                "enum `{enum_type}` at `{}` must carry a constant name",
                walker.path()
            ))
        })?;

        let Some(TypeDefinition::Enum(decl)) = walker.registry().definition(enum_type) else {
            return Err(MarshalError::UnknownType(enum_type.to_string()));
        };
        if !decl.constants.iter().any(|c| c == constant) {
            debug!(enum_type, constant, "Enum constant not known locally");
            return Err(MarshalError::UnknownEnumConstant {
                enum_type: enum_type.to_string(),
                constant: constant.to_string(),
            });
        }
        Ok(Value::Enum(EnumValue::new(enum_type, constant)))
    }
}
