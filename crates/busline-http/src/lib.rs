//! busline-http - HTTP content adapter
//!
//! This crate provides:
//! - [`MarshallingProvider`] reading and writing marshalled bodies for
//!   JSON-family media types
//! - [`ProviderError`] mapping failures to HTTP error responses
//! - [`is_json_media_type`] for content negotiation

mod error;
mod media;
mod provider;

pub use error::ProviderError;
pub use media::{APPLICATION_JSON, is_json_media_type};
pub use provider::MarshallingProvider;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{MarshallingProvider, ProviderError, is_json_media_type};
}
