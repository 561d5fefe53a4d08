//! busline-logging - Tracing subscriber setup
//!
//! This crate provides:
//! - [`init_logging`] installing a fmt subscriber behind a reloadable level filter
//! - [`ReloadHandle`] for changing the log level at runtime
//! - [`LoggingError`] for setup and reload failures

mod init;
mod reload;

pub use busline_core::LogLevel;
pub use init::{LoggingError, init_logging};
pub use reload::ReloadHandle;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{LogLevel, LoggingError, ReloadHandle, init_logging};
}
