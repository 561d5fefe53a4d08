//! Marshalling content adapter for HTTP bodies

use crate::error::ProviderError;
use crate::media::{APPLICATION_JSON, is_json_media_type};
use busline_marshal::{MarshalError, MarshalResult, Marshalling, TypeDescriptor, Value};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Request, Response, StatusCode};
use std::io::{Read, Write};
use tracing::{debug, warn};

/// Reads and writes marshalled bodies for `application/json` and
/// `application/*+json`
///
/// Eligibility is the media type match plus the registry being able to
/// handle the target type. Writes buffer the whole payload, so the size is
/// never known in advance.
#[derive(Debug, Clone)]
pub struct MarshallingProvider {
    marshalling: Marshalling,
}

impl MarshallingProvider {
    pub fn new(marshalling: Marshalling) -> Self {
        Self { marshalling }
    }

    /// Provider over the process-wide registry
    pub fn global() -> MarshalResult<Self> {
        Marshalling::global().map(Self::new)
    }

    pub fn marshalling(&self) -> &Marshalling {
        &self.marshalling
    }

    pub fn accepts_media_type(&self, media_type: &str) -> bool {
        is_json_media_type(media_type)
    }

    /// Whether a body of `media_type` can be read as `target`
    pub fn is_readable(&self, target: &TypeDescriptor, media_type: &str) -> bool {
        self.accepts_media_type(media_type) && self.marshalling.can_handle(target)
    }

    /// Whether a value of type `declared` can be written as `media_type`
    pub fn is_writeable(&self, declared: &TypeDescriptor, media_type: &str) -> bool {
        self.accepts_media_type(media_type) && self.marshalling.can_handle(declared)
    }

    /// Size of the encoded body; unknown until written
    pub fn size(&self, _value: &Value) -> Option<u64> {
        None
    }

    /// Encode `value` and write the whole payload to `out`
    pub fn write_to<W: Write>(
        &self,
        value: &Value,
        declared: &TypeDescriptor,
        out: &mut W,
    ) -> Result<(), ProviderError> {
        let body = self.encode(value, declared)?;
        out.write_all(&body)?;
        Ok(())
    }

    /// Read the whole body from `input` and decode it as `target`
    pub fn read_from<R: Read>(
        &self,
        target: &TypeDescriptor,
        mut input: R,
    ) -> Result<Value, ProviderError> {
        let mut body = Vec::new();
        input.read_to_end(&mut body)?;
        self.decode(&body, target)
    }

    /// Build a `200 OK` JSON response carrying `value`
    pub fn write_response(
        &self,
        value: &Value,
        declared: &TypeDescriptor,
    ) -> Result<Response<Bytes>, ProviderError> {
        let body = self.encode(value, declared)?;
        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() = StatusCode::OK;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        Ok(response)
    }

    /// Decode a request body as `target`
    ///
    /// Returns `Ok(None)` without touching the body when the request's
    /// content type is not JSON or `target` is not marshallable.
    pub fn read_request(
        &self,
        request: &Request<Bytes>,
        target: &TypeDescriptor,
    ) -> Result<Option<Value>, ProviderError> {
        let media_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        let Some(media_type) = media_type else {
            warn!(target_type = %target, "Declining request without a readable content type");
            return Ok(None);
        };
        if !self.is_readable(target, media_type) {
            warn!(target_type = %target, media_type, "Declining request body");
            return Ok(None);
        }
        self.decode(request.body(), target).map(Some)
    }

    fn encode(&self, value: &Value, declared: &TypeDescriptor) -> Result<Vec<u8>, ProviderError> {
        let token = self
            .marshalling
            .marshal(value, declared)
            .map_err(ProviderError::Encode)?;
        let body = serde_json::to_vec(&token)
            .map_err(|e| ProviderError::Encode(MarshalError::from(e)))?;
        debug!(declared = %declared, bytes = body.len(), "Body written");
        Ok(body)
    }

    fn decode(&self, body: &[u8], target: &TypeDescriptor) -> Result<Value, ProviderError> {
        let token: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ProviderError::Decode(MarshalError::from(e)))?;
        let value = self
            .marshalling
            .unmarshal(&token, target)
            .map_err(ProviderError::Decode)?;
        debug!(target_type = %target, bytes = body.len(), "Body read");
        Ok(value)
    }
}
