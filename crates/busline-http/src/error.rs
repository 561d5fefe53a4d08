//! Content adapter errors and their HTTP mapping

use crate::media::APPLICATION_JSON;
use busline_marshal::MarshalError;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};
use thiserror::Error;

/// Errors raised while reading or writing a marshalled body
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot decode body: {0}")]
    Decode(#[source] MarshalError),

    #[error("cannot encode body: {0}")]
    Encode(#[source] MarshalError),
}

impl ProviderError {
    /// HTTP status reported for this failure
    ///
    /// Bodies that fail to decode are the client's fault; failing to encode
    /// a local value is the server's.
    pub fn status(&self) -> StatusCode {
        match self {
            ProviderError::Decode(_) => StatusCode::BAD_REQUEST,
            ProviderError::Io(_) | ProviderError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable numeric code of the underlying marshalling error, 0 for I/O
    pub fn error_code(&self) -> u32 {
        match self {
            ProviderError::Io(_) => 0,
            ProviderError::Decode(err) | ProviderError::Encode(err) => err.error_code(),
        }
    }

    /// Render as a JSON error response
    pub fn into_response(self) -> Response<Bytes> {
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.error_code(),
        });
        let mut response = Response::new(Bytes::from(body.to_string()));
        *response.status_mut() = self.status();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        response
    }
}
