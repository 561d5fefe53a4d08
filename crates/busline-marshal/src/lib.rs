//! busline-marshal - Polymorphic JSON marshalling of object graphs
//!
//! This crate provides:
//! - [`Value`] and [`ObjectRef`], the dynamic value model
//! - [`TypeRegistry`] mapping type ids to strategies, field tables and factories
//! - [`Strategy`] implementations for every builtin shape
//! - [`GraphWalker`] driving one pass with a [`ReferenceTable`] for identity
//! - [`Marshalling`] and [`MappingContext`] as entry points

mod context;
mod marshalling;
mod reference;
mod registry;
pub mod strategy;
mod value;
mod walker;

pub use context::MappingContext;
pub use marshalling::Marshalling;
pub use reference::ReferenceTable;
pub use registry::{
    Factory, FieldDescriptor, FieldTable, InstancePlan, Resolved, StrategyRef, TypeDefinition,
    TypeRegistry, default_value,
};
pub use strategy::{Strategy, TypeSite};
pub use value::{
    CollectionKind, CollectionValue, EnumValue, FieldValues, MapValue, ObjectRef, StackFrame,
    ThrowableValue, Value,
};
pub use walker::{FieldPath, GraphWalker};

// Re-export core types used in this crate's signatures
pub use busline_core::{MarshalError, MarshalResult, TypeDescriptor};
