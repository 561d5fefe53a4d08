//! busline-core - Core types, errors, and configuration
//!
//! This crate provides the foundational types shared by the busline crates:
//! - [`TypeDescriptor`] naming every marshallable shape
//! - [`MarshalError`] for error handling
//! - [`WalkState`] for the graph walker state machine
//! - [`BusConfig`] and [`MappingConfig`] for static configuration

mod config;
mod descriptor;
mod error;
mod walk_state;

pub use config::{
    AliasDeclaration, BusConfig, EnumDeclaration, FieldDeclaration, Instantiation, MappingConfig,
    ObjectDeclaration,
};
pub use descriptor::TypeDescriptor;
pub use error::{MarshalError, MarshalResult};
pub use walk_state::WalkState;

use serde::{Deserialize, Serialize};

/// Log levels accepted by configuration
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Off = 5,
}

impl std::str::FromStr for LogLevel {
    type Err = MarshalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(MarshalError::Config(format!("unknown log level: {other}"))),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BusConfig, LogLevel, MappingConfig, MarshalError, MarshalResult, TypeDescriptor, WalkState,
    };
}
