//! Errors with message, cause chain and stack trace

use super::{Strategy, TypeSite, VALUE, member, mismatch, typed_token};
use crate::value::{StackFrame, ThrowableValue, Value};
use crate::walker::GraphWalker;
use busline_core::{MarshalError, MarshalResult};
use serde_json::{Map, Value as Json, json};

const ERROR_TYPE: &str = "ErrorType";
const MESSAGE: &str = "Message";
const CAUSE: &str = "Cause";
const STACK_TRACE: &str = "StackTrace";
const DECLARING_CLASS: &str = "DeclaringClass";
const METHOD_NAME: &str = "MethodName";
const FILE_NAME: &str = "FileName";
const LINE_NUMBER: &str = "LineNumber";

#[derive(Debug, Default, Clone, Copy)]
pub struct ThrowableStrategy;

impl Strategy for ThrowableStrategy {
    fn encode(
        &self,
        value: &Value,
        site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Json> {
        let Value::Throwable(error) = value else {
            return Err(mismatch(site, value, walker));
        };
        let mut token = typed_token(site.encoded);
        token.insert(VALUE.to_string(), encode_payload(error));
        Ok(Json::Object(token))
    }

    fn decode(
        &self,
        token: &Map<String, Json>,
        _site: &TypeSite<'_>,
        walker: &mut GraphWalker<'_>,
    ) -> MarshalResult<Value> {
        decode_payload(member(token, VALUE)?, walker).map(Value::Throwable)
    }
}

fn encode_payload(error: &ThrowableValue) -> Json {
    let frames: Vec<Json> = error
        .stack_trace()
        .iter()
        .map(|frame| {
            json!({
                DECLARING_CLASS: frame.declaring_class,
                METHOD_NAME: frame.method_name,
                FILE_NAME: frame.file_name,
                LINE_NUMBER: frame.line_number,
            })
        })
        .collect();

    json!({
        ERROR_TYPE: error.error_type(),
        MESSAGE: error.message(),
        CAUSE: error.cause().map(encode_payload),
        STACK_TRACE: frames,
    })
}

fn decode_payload(json: &Json, walker: &mut GraphWalker<'_>) -> MarshalResult<ThrowableValue> {
    let payload = json
        .as_object()
        .ok_or_else(|| malformed_at(walker, "throwable payload must be an object"))?;

    let error_type = text(payload, ERROR_TYPE, walker)?
        .ok_or_else(|| malformed_at(walker, format!("throwable is missing `{ERROR_TYPE}`")))?;
    let mut error = ThrowableValue::new(error_type, text(payload, MESSAGE, walker)?);

    match payload.get(CAUSE) {
        None | Some(Json::Null) => {}
        Some(cause) => {
            let cause = walker.descend(CAUSE, |walker| decode_payload(cause, walker))?;
            error = error.with_cause(cause);
        }
    }

    let frames = match payload.get(STACK_TRACE) {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(frames)) => frames
            .iter()
            .map(|frame| decode_frame(frame, walker))
            .collect::<MarshalResult<Vec<_>>>()?,
        Some(_) => {
            return Err(malformed_at(walker, format!("`{STACK_TRACE}` must be an array")));
        }
    };
    Ok(error.with_stack_trace(frames))
}

fn decode_frame(json: &Json, walker: &GraphWalker<'_>) -> MarshalResult<StackFrame> {
    let frame = json
        .as_object()
        .ok_or_else(|| malformed_at(walker, "stack frame must be an object"))?;
    let required = |key: &str| -> MarshalResult<String> {
        text(frame, key, walker)?
            .ok_or_else(|| malformed_at(walker, format!("stack frame is missing `{key}`")))
    };
    let line_number = match frame.get(LINE_NUMBER) {
        None | Some(Json::Null) => -1,
        Some(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| malformed_at(walker, format!("`{LINE_NUMBER}` must be an int")))?,
    };

    Ok(StackFrame {
        declaring_class: required(DECLARING_CLASS)?,
        method_name: required(METHOD_NAME)?,
        file_name: text(frame, FILE_NAME, walker)?,
        line_number,
    })
}

fn malformed_at(walker: &GraphWalker<'_>, message: impl std::fmt::Display) -> MarshalError {
    MarshalError::malformed(format!("{message} at `{}`", walker.path()))
}

/// Optional string member; anything but a string or null is malformed
fn text(
    object: &Map<String, Json>,
    key: &str,
    walker: &GraphWalker<'_>,
) -> MarshalResult<Option<String>> {
    match object.get(key) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(malformed_at(walker, format!("`{key}` must be a string, got {other}"))),
    }
}

#[cfg(test)]
#[path = "throwable/throwable_tests.rs"]
mod throwable_tests;
