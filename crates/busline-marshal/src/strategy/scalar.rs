//! Booleans, integers, floats, chars and strings

use super::{Strategy, TypeSite, VALUE, member, mismatch, typed_token};
use crate::value::Value;
use crate::walker::GraphWalker;
use busline_core::{MarshalError, MarshalResult, TypeDescriptor};
use serde_json::{Map, Number, Value as Json};

const NAN: &str = "NaN";
const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";

/// Strategy for scalars reached through an `any` slot
///
/// Scalars in a slot declared with their exact type skip the typed token and
/// travel as bare literals.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarStrategy;

impl Strategy for ScalarStrategy {
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json> {
        if !site.shape.is_scalar() {
            return Err(mismatch(site, value, walker));
        }
        let mut token = typed_token(site.encoded);
        token.insert(VALUE.to_string(), encode_literal(value, walker)?);
        Ok(Json::Object(token))
    }

    fn decode(
        &self,
        token: &Map<String, Json>,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value> {
        decode_literal(member(token, VALUE)?, site.shape, walker)
    }
}

/// Bare literal for a scalar value
///
/// `long` becomes a string so that readers limited to doubles keep every
/// digit; non-finite floats become `"NaN"`, `"Infinity"` or `"-Infinity"`.
pub fn encode_literal(value: &Value, walker: &GraphWalker<'_>) -> MarshalResult<Json> {
    Ok(match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Long(l) => Json::String(l.to_string()),
        Value::Float(f) if f.is_finite() => {
            // Shortest text that reads back as the same f32
            let widened: f64 = f
                .to_string()
                .parse()
                .map_err(|_| MarshalError::unsupported("float", walker.path()))?;
            Json::Number(finite_number(widened, walker)?)
        }
        Value::Float(f) => Json::String(non_finite(f64::from(*f)).to_string()),
        Value::Double(d) if d.is_finite() => Json::Number(finite_number(*d, walker)?),
        Value::Double(d) => Json::String(non_finite(*d).to_string()),
        Value::Char(c) => Json::String(c.to_string()),
        Value::String(s) => Json::String(s.clone()),
        other => {
            return Err(MarshalError::unsupported(
                format!("{} as a literal", other.descriptor()),
                walker.path(),
            ));
        }
    })
}

fn finite_number(value: f64, walker: &GraphWalker<'_>) -> MarshalResult<Number> {
    Number::from_f64(value).ok_or_else(|| MarshalError::unsupported("double", walker.path()))
}

fn non_finite(value: f64) -> &'static str {
    if value.is_nan() {
        NAN
    } else if value > 0.0 {
        INFINITY
    } else {
        NEG_INFINITY
    }
}

fn parse_non_finite(text: &str) -> Option<f64> {
    match text {
        NAN => Some(f64::NAN),
        INFINITY => Some(f64::INFINITY),
        NEG_INFINITY => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

/// Read a bare literal as the given scalar type
pub fn decode_literal(
    literal: &Json,
    declared: &TypeDescriptor,
    walker: &GraphWalker<'_>,
) -> MarshalResult<Value> {
    let decoded = match (declared, literal) {
        (TypeDescriptor::Bool, Json::Bool(b)) => Some(Value::Bool(*b)),
        (TypeDescriptor::Int, Json::Number(n)) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::Int),
        (TypeDescriptor::Long, Json::Number(n)) => n.as_i64().map(Value::Long),
        (TypeDescriptor::Long, Json::String(s)) => s.parse().ok().map(Value::Long),
        (TypeDescriptor::Float, Json::Number(n)) => n.as_f64().map(|f| Value::Float(f as f32)),
        (TypeDescriptor::Float, Json::String(s)) => {
            parse_non_finite(s).map(|f| Value::Float(f as f32))
        }
        (TypeDescriptor::Double, Json::Number(n)) => n.as_f64().map(Value::Double),
        (TypeDescriptor::Double, Json::String(s)) => parse_non_finite(s).map(Value::Double),
        (TypeDescriptor::Char, Json::String(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        (TypeDescriptor::String, Json::String(s)) => Some(Value::String(s.clone())),
        _ => None,
    };

    decoded.ok_or_else(|| {
        MarshalError::malformed(format!(
            "expected {declared} at `{}`, got {literal}",
            walker.path()
        ))
    })
}

/// Read a bare literal found in an `any` slot
///
/// Integers become `int` when they fit, else `long`; other numbers become
/// `double`.
pub fn infer_literal(literal: &Json, walker: &GraphWalker<'_>) -> MarshalResult<Value> {
    match literal {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Ok(i32::try_from(i).map_or(Value::Long(i), Value::Int)),
            None => n.as_f64().map(Value::Double).ok_or_else(|| {
                MarshalError::malformed(format!("unreadable number {n} at `{}`", walker.path()))
            }),
        },
        other => Err(MarshalError::malformed(format!(
            "unexpected literal {other} at `{}`",
            walker.path()
        ))),
    }
}

#[cfg(test)]
#[path = "scalar/scalar_tests.rs"]
mod scalar_tests;
