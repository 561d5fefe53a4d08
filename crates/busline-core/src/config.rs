//! Bus and type-mapping configuration
//!
//! The mapping is static: it is supplied once at process start and never
//! discovered per call. Factories are functions and therefore registered in
//! code; the mapping only declares that a type is factory-built.

use crate::LogLevel;
use crate::descriptor::TypeDescriptor;
use crate::error::{MarshalError, MarshalResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Top-level configuration for a busline process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusConfig {
    /// Initial log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Whether the wire codec pretty-prints its output
    #[serde(default)]
    pub pretty: bool,

    /// Declared marshallable types
    #[serde(default)]
    pub mapping: MappingConfig,
}

impl BusConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> MarshalResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes).map_err(|e| MarshalError::Config(e.to_string()))
    }

    /// Create configuration from TOML text
    pub fn from_toml(text: &str) -> MarshalResult<Self> {
        toml::from_str(text).map_err(|e| MarshalError::Config(e.to_string()))
    }
}

/// How instances of a declared object type are created during decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instantiation {
    /// Zero-argument construction with default field values
    #[default]
    Default,
    /// A factory function registered in code under the type id
    Factory,
    /// The type is encode-only
    None,
}

/// A declared object field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,

    #[serde(rename = "type", default)]
    pub declared: TypeDescriptor,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, declared: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            declared,
        }
    }
}

/// A declared object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDeclaration {
    pub id: String,

    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,

    #[serde(default)]
    pub instantiation: Instantiation,

    /// Declared parent object; its fields are inherited and the type conforms to it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
}

/// A declared enum type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    pub id: String,

    #[serde(default)]
    pub constants: Vec<String>,
}

/// A named subtype of a builtin container, e.g. `CustomList extends list<string>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDeclaration {
    pub id: String,

    pub extends: TypeDescriptor,
}

/// The declared type mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default)]
    pub objects: Vec<ObjectDeclaration>,

    #[serde(default)]
    pub enums: Vec<EnumDeclaration>,

    #[serde(default)]
    pub aliases: Vec<AliasDeclaration>,
}

impl MappingConfig {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a mapping from JSON bytes
    pub fn from_json(bytes: &[u8]) -> MarshalResult<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes).map_err(|e| MarshalError::Config(e.to_string()))
    }

    /// Parse a mapping from TOML text
    pub fn from_toml(text: &str) -> MarshalResult<Self> {
        toml::from_str(text).map_err(|e| MarshalError::Config(e.to_string()))
    }

    /// Every type id declared by this mapping
    pub fn declared_ids(&self) -> impl Iterator<Item = &str> {
        self.objects
            .iter()
            .map(|o| o.id.as_str())
            .chain(self.enums.iter().map(|e| e.id.as_str()))
            .chain(self.aliases.iter().map(|a| a.id.as_str()))
    }

    /// Check ids and member names for emptiness, duplicates, and builtin collisions
    ///
    /// Whether referenced descriptors resolve is the registry's concern.
    pub fn validate(&self) -> MarshalResult<()> {
        let mut seen = HashSet::new();
        for id in self.declared_ids() {
            if id.is_empty() {
                return Err(MarshalError::Config("type id must not be empty".into()));
            }
            if TypeDescriptor::is_builtin_name(id) {
                return Err(MarshalError::Config(format!(
                    "type id `{id}` collides with a builtin type"
                )));
            }
            if !seen.insert(id) {
                return Err(MarshalError::Config(format!("type id `{id}` declared twice")));
            }
        }

        for object in &self.objects {
            let mut names = HashSet::new();
            for field in &object.fields {
                if field.name.is_empty() {
                    return Err(MarshalError::Config(format!(
                        "object `{}` has a field with an empty name",
                        object.id
                    )));
                }
                if !names.insert(field.name.as_str()) {
                    return Err(MarshalError::Config(format!(
                        "object `{}` declares field `{}` twice",
                        object.id, field.name
                    )));
                }
            }
        }

        self.validate_parents()?;

        for decl in &self.enums {
            let mut names = HashSet::new();
            for constant in &decl.constants {
                if !names.insert(constant.as_str()) {
                    return Err(MarshalError::Config(format!(
                        "enum `{}` declares constant `{}` twice",
                        decl.id, constant
                    )));
                }
            }
        }

        for alias in &self.aliases {
            if !matches!(
                alias.extends,
                TypeDescriptor::List(_)
                    | TypeDescriptor::Set(_)
                    | TypeDescriptor::Queue(_)
                    | TypeDescriptor::Map(_, _)
                    | TypeDescriptor::Named(_)
            ) {
                return Err(MarshalError::Config(format!(
                    "alias `{}` must extend a container or another alias, not `{}`",
                    alias.id, alias.extends
                )));
            }
        }

        Ok(())
    }

    /// Parents declared in this mapping must not lead back to the child
    ///
    /// Parents declared elsewhere are checked once registered.
    fn validate_parents(&self) -> MarshalResult<()> {
        let parents: HashMap<&str, &str> = self
            .objects
            .iter()
            .filter_map(|o| o.extends.as_deref().map(|parent| (o.id.as_str(), parent)))
            .collect();

        for (&child, &parent) in &parents {
            if parent.is_empty() {
                return Err(MarshalError::Config(format!(
                    "object `{child}` extends an empty type id"
                )));
            }
            let mut seen = HashSet::from([child]);
            let mut current = parent;
            loop {
                if !seen.insert(current) {
                    return Err(MarshalError::Config(format!(
                        "object `{child}` has a cyclic parent chain through `{current}`"
                    )));
                }
                match parents.get(current) {
                    Some(&next) => current = next,
                    None => break,
                }
            }
        }
        Ok(())
    }
}
