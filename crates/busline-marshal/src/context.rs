//! Process-wide type registry

use crate::registry::TypeRegistry;
use busline_core::{MappingConfig, MarshalError, MarshalResult};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

static REGISTRY: OnceCell<Arc<TypeRegistry>> = OnceCell::new();

/// Entry point to the registry shared by every pass in the process
///
/// The registry is installed once at startup and never torn down. Factories
/// and custom strategies may still be registered on it afterwards.
pub struct MappingContext;

impl MappingContext {
    /// Build the process-wide registry from a mapping
    pub fn init(mapping: &MappingConfig) -> MarshalResult<Arc<TypeRegistry>> {
        Self::install(TypeRegistry::from_mapping(mapping)?)
    }

    /// Install an already-built registry as the process-wide one
    pub fn install(registry: TypeRegistry) -> MarshalResult<Arc<TypeRegistry>> {
        let registry = Arc::new(registry);
        REGISTRY
            .set(registry.clone())
            .map_err(|_| MarshalError::Config("mapping context already initialized".into()))?;
        info!(types = registry.len(), "Mapping context initialized");
        Ok(registry)
    }

    /// The process-wide registry
    pub fn global() -> MarshalResult<Arc<TypeRegistry>> {
        REGISTRY
            .get()
            .cloned()
            .ok_or_else(|| MarshalError::Config("mapping context not initialized".into()))
    }

    pub fn is_initialized() -> bool {
        REGISTRY.get().is_some()
    }
}
