//! Subscriber installation

use crate::reload::{ReloadHandle, convert_level_to_filter};
use busline_core::LogLevel;
use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload};

/// Errors from logging setup
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("a global subscriber is already installed")]
    AlreadyInstalled,

    #[error("reload handle not initialized")]
    NotInitialized,

    #[error("failed to reload filter: {0}")]
    Reload(String),
}

/// Install the global subscriber: a reloadable level filter over a fmt layer
/// writing to stderr
///
/// Call once at startup. The filter can later be changed through
/// [`ReloadHandle::global`].
pub fn init_logging(level: LogLevel) -> Result<(), LoggingError> {
    let (filter, handle) = reload::Layer::new(convert_level_to_filter(level));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::AlreadyInstalled)?;
    ReloadHandle::global().set_handle(handle, level);
    tracing::debug!(%level, "Logging initialized");
    Ok(())
}

#[cfg(test)]
#[path = "init/init_tests.rs"]
mod init_tests;
