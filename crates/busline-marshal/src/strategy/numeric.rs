//! Arbitrary-precision integers and decimals, carried as decimal strings

use super::{Strategy, TypeSite, VALUE, member, mismatch, typed_token};
use crate::value::Value;
use crate::walker::GraphWalker;
use bigdecimal::BigDecimal;
use busline_core::{MarshalError, MarshalResult, TypeDescriptor};
use num_bigint::BigInt;
use serde_json::{Map, Value as Json};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy)]
pub struct BigNumberStrategy;

impl Strategy for BigNumberStrategy {
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json> {
        let text = match value {
            Value::BigInteger(n) => n.to_string(),
            Value::BigDecimal(d) => d.to_string(),
            other => return Err(mismatch(site, other, walker)),
        };
        let mut token = typed_token(site.encoded);
        token.insert(VALUE.to_string(), Json::String(text));
        Ok(Json::Object(token))
    }

    fn decode(
        &self,
        token: &Map<String, Json>,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value> {
        // Numbers are accepted too, for peers that do not quote them
        let text = match member(token, VALUE)? {
            Json::String(s) => s.clone(),
            Json::Number(n) => n.to_string(),
            other => {
                return Err(MarshalError::malformed(format!(
                    "expected a decimal string at `{}`, got {other}",
                    walker.path()
                )));
            }
        };

        let invalid = || {
            MarshalError::malformed(format!(
                "`{text}` is not a valid {} at `{}`",
                site.shape,
                walker.path()
            ))
        };
        match site.shape {
            TypeDescriptor::BigInteger => BigInt::from_str(&text)
                .map(Value::BigInteger)
                .map_err(|_| invalid()),
            TypeDescriptor::BigDecimal => BigDecimal::from_str(&text)
                .map(Value::BigDecimal)
                .map_err(|_| invalid()),
            other => Err(MarshalError::malformed(format!(
                "`{other}` is not an arbitrary-precision type"
            ))),
        }
    }
}
