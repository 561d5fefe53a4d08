//! Type registry: type ids to strategies, field tables and instantiation

use crate::strategy::{
    BigNumberStrategy, CollectionStrategy, EnumStrategy, MapStrategy, ObjectStrategy,
    ScalarStrategy, Strategy, TemporalStrategy, ThrowableStrategy,
};
use crate::value::{FieldValues, ObjectRef, Value};
use busline_core::{
    EnumDeclaration, Instantiation, MappingConfig, MarshalError, MarshalResult,
    ObjectDeclaration, TypeDescriptor,
};
use dashmap::DashMap;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Longest alias or parent chain followed before it is treated as cyclic
const MAX_ALIAS_DEPTH: usize = 32;

static SCALAR: ScalarStrategy = ScalarStrategy;
static BIG_NUMBER: BigNumberStrategy = BigNumberStrategy;
static TEMPORAL: TemporalStrategy = TemporalStrategy;
static THROWABLE: ThrowableStrategy = ThrowableStrategy;
static COLLECTION: CollectionStrategy = CollectionStrategy;
static MAP: MapStrategy = MapStrategy;
static ENUM: EnumStrategy = EnumStrategy;
static OBJECT: ObjectStrategy = ObjectStrategy;

/// Builds an object's final fields from its decoded fields
///
/// Used for types that cannot be default-constructed. The input holds every
/// field present on the wire; the output replaces the instance's fields.
pub type Factory = Arc<dyn Fn(FieldValues) -> MarshalResult<FieldValues> + Send + Sync>;

/// A registered definition
#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Object(Arc<ObjectDeclaration>),
    Enum(Arc<EnumDeclaration>),
    /// Named subtype of a builtin container or of another alias
    Alias(TypeDescriptor),
}

/// Strategy handle returned by [`TypeRegistry::resolve`]
#[derive(Clone)]
pub enum StrategyRef {
    Builtin(&'static dyn Strategy),
    Custom(Arc<dyn Strategy>),
}

impl Deref for StrategyRef {
    type Target = dyn Strategy;

    fn deref(&self) -> &Self::Target {
        match self {
            StrategyRef::Builtin(s) => *s,
            StrategyRef::Custom(s) => s.as_ref(),
        }
    }
}

impl std::fmt::Debug for StrategyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyRef::Builtin(_) => f.write_str("StrategyRef::Builtin"),
            StrategyRef::Custom(_) => f.write_str("StrategyRef::Custom"),
        }
    }
}

/// Result of resolving a descriptor
#[derive(Debug, Clone)]
pub struct Resolved {
    pub strategy: StrategyRef,
    /// Shape the strategy works on; aliases resolve to their builtin container
    pub shape: TypeDescriptor,
}

/// Binding of one declared object field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub declared: TypeDescriptor,
    pub position: usize,
}

impl FieldDescriptor {
    /// Read this field from an instance; unset fields read as null
    pub fn read(&self, object: &ObjectRef) -> Value {
        object.get(&self.name).unwrap_or_default()
    }

    /// Write this field on an instance
    pub fn write(&self, object: &ObjectRef, value: Value) {
        object.set(self.name.clone(), value);
    }
}

/// Field descriptors of one object type, in declaration order
///
/// Inherited fields come first, root parent first; a field redeclared by a
/// subtype keeps the parent's position and takes the subtype's type.
#[derive(Debug, Clone)]
pub struct FieldTable {
    type_id: String,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl FieldTable {
    /// Build from a lineage ordered root parent first
    fn build(type_id: &str, lineage: &[Arc<ObjectDeclaration>]) -> Self {
        let mut fields: Vec<FieldDescriptor> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for f in lineage.iter().flat_map(|decl| decl.fields.iter()) {
            match index.get(&f.name) {
                Some(&position) => fields[position].declared = f.declared.clone(),
                None => {
                    let position = fields.len();
                    index.insert(f.name.clone(), position);
                    fields.push(FieldDescriptor {
                        name: f.name.clone(),
                        declared: f.declared.clone(),
                        position,
                    });
                }
            }
        }
        Self {
            type_id: type_id.to_string(),
            fields,
            index,
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// How the next instance of an object type will be built
#[derive(Clone)]
pub enum InstancePlan {
    Factory(Factory),
    Default,
}

/// Registry of marshallable types
///
/// Registration takes `&self` so a registry can be shared behind an `Arc`
/// while still being configured; passes only read from it.
#[derive(Default)]
pub struct TypeRegistry {
    definitions: DashMap<String, TypeDefinition>,
    factories: DashMap<String, Factory>,
    strategies: DashMap<String, Arc<dyn Strategy>>,
    field_tables: DashMap<String, Arc<FieldTable>>,
    /// Bumped on every definition change; tables built across a bump are not cached
    generation: AtomicU64,
}

impl TypeRegistry {
    /// Create a registry that knows only the builtin shapes
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a declared mapping
    pub fn from_mapping(mapping: &MappingConfig) -> MarshalResult<Self> {
        mapping.validate()?;
        let registry = Self::new();
        for decl in &mapping.objects {
            registry.register_object(decl.clone())?;
        }
        for decl in &mapping.enums {
            registry.register_enum(decl.clone())?;
        }
        for alias in &mapping.aliases {
            registry.register_alias(alias.id.clone(), alias.extends.clone())?;
        }
        debug!(
            objects = mapping.objects.len(),
            enums = mapping.enums.len(),
            aliases = mapping.aliases.len(),
            "Type registry built from mapping"
        );
        Ok(registry)
    }

    pub fn register_object(&self, decl: ObjectDeclaration) -> MarshalResult<()> {
        let id = Self::check_id(&decl.id)?;
        self.define(id, TypeDefinition::Object(Arc::new(decl)));
        Ok(())
    }

    pub fn register_enum(&self, decl: EnumDeclaration) -> MarshalResult<()> {
        let id = Self::check_id(&decl.id)?;
        self.define(id, TypeDefinition::Enum(Arc::new(decl)));
        Ok(())
    }

    pub fn register_alias(
        &self,
        id: impl Into<String>,
        extends: TypeDescriptor,
    ) -> MarshalResult<()> {
        let id = id.into();
        Self::check_id(&id)?;
        self.define(id, TypeDefinition::Alias(extends));
        Ok(())
    }

    /// Register the factory building instances of `id`
    ///
    /// A factory takes precedence over default construction.
    pub fn register_factory<F>(&self, id: impl Into<String>, factory: F) -> MarshalResult<()>
    where
        F: Fn(FieldValues) -> MarshalResult<FieldValues> + Send + Sync + 'static,
    {
        let id = id.into();
        Self::check_id(&id)?;
        self.factories.insert(id, Arc::new(factory));
        Ok(())
    }

    /// Register a custom strategy; it takes precedence over any definition of `id`
    pub fn register_strategy(
        &self,
        id: impl Into<String>,
        strategy: Arc<dyn Strategy>,
    ) -> MarshalResult<()> {
        let id = id.into();
        Self::check_id(&id)?;
        self.strategies.insert(id, strategy);
        Ok(())
    }

    fn check_id(id: &str) -> MarshalResult<String> {
        if id.is_empty() || TypeDescriptor::is_builtin_name(id) {
            return Err(MarshalError::Config(format!(
                "`{id}` cannot be registered as a type id"
            )));
        }
        Ok(id.to_string())
    }

    fn define(&self, id: String, definition: TypeDefinition) {
        self.definitions.insert(id, definition);
        // Subtypes inherit from this table, so every cached table may be stale
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.field_tables.clear();
    }

    /// Definition registered under `id`
    pub fn definition(&self, id: &str) -> Option<TypeDefinition> {
        self.definitions.get(id).map(|d| d.value().clone())
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Find the strategy for a descriptor
    pub fn resolve(&self, desc: &TypeDescriptor) -> MarshalResult<Resolved> {
        let mut current = desc.clone();
        for _ in 0..MAX_ALIAS_DEPTH {
            let id = match &current {
                TypeDescriptor::Named(id) => id.clone(),
                builtin => return Self::resolve_builtin(builtin),
            };

            if let Some(custom) = self.strategies.get(&id) {
                trace!(type_id = %id, "Resolved custom strategy");
                return Ok(Resolved {
                    strategy: StrategyRef::Custom(custom.value().clone()),
                    shape: TypeDescriptor::Named(id),
                });
            }

            match self.definition(&id) {
                Some(TypeDefinition::Object(_)) => {
                    let strategy = match self.inherited_strategy(&id) {
                        Some(custom) => StrategyRef::Custom(custom),
                        None => StrategyRef::Builtin(&OBJECT),
                    };
                    return Ok(Resolved {
                        strategy,
                        shape: TypeDescriptor::Named(id),
                    });
                }
                Some(TypeDefinition::Enum(_)) => {
                    return Ok(Resolved {
                        strategy: StrategyRef::Builtin(&ENUM),
                        shape: TypeDescriptor::Named(id),
                    });
                }
                Some(TypeDefinition::Alias(target)) => current = target,
                None => return Err(MarshalError::UnknownType(id)),
            }
        }
        Err(MarshalError::UnknownType(format!(
            "{desc} (alias chain does not terminate)"
        )))
    }

    /// Custom strategy registered for the nearest ancestor of an object type
    fn inherited_strategy(&self, id: &str) -> Option<Arc<dyn Strategy>> {
        let mut current = self.parent_of(id)?;
        for _ in 0..MAX_ALIAS_DEPTH {
            if let Some(custom) = self.strategies.get(&current) {
                trace!(type_id = %id, ancestor = %current, "Resolved inherited strategy");
                return Some(custom.value().clone());
            }
            current = self.parent_of(&current)?;
        }
        None
    }

    fn resolve_builtin(desc: &TypeDescriptor) -> MarshalResult<Resolved> {
        let strategy: &'static dyn Strategy = match desc {
            TypeDescriptor::Any | TypeDescriptor::Named(_) => {
                return Err(MarshalError::UnknownType(desc.to_string()));
            }
            TypeDescriptor::Bool
            | TypeDescriptor::Int
            | TypeDescriptor::Long
            | TypeDescriptor::Float
            | TypeDescriptor::Double
            | TypeDescriptor::Char
            | TypeDescriptor::String => &SCALAR,
            TypeDescriptor::BigInteger | TypeDescriptor::BigDecimal => &BIG_NUMBER,
            TypeDescriptor::Timestamp | TypeDescriptor::Date | TypeDescriptor::Time => &TEMPORAL,
            TypeDescriptor::Throwable => &THROWABLE,
            TypeDescriptor::List(_) | TypeDescriptor::Set(_) | TypeDescriptor::Queue(_) => {
                &COLLECTION
            }
            TypeDescriptor::Map(_, _) => &MAP,
        };
        Ok(Resolved {
            strategy: StrategyRef::Builtin(strategy),
            shape: desc.clone(),
        })
    }

    /// Whether a descriptor and everything nested in it resolves
    ///
    /// `any` is handleable: the wire token describes itself.
    pub fn can_handle(&self, desc: &TypeDescriptor) -> bool {
        desc.walk().into_iter().all(|d| match d {
            TypeDescriptor::Any => true,
            TypeDescriptor::Named(_) => self
                .resolve(d)
                .is_ok_and(|r| r.shape == *d || self.can_handle(&r.shape)),
            _ => true,
        })
    }

    /// Check that every descriptor referenced by a definition resolves
    pub fn check_references(&self) -> MarshalResult<()> {
        let definitions: Vec<(String, TypeDefinition)> = self
            .definitions
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        for (id, definition) in definitions {
            let referenced: Vec<TypeDescriptor> = match definition {
                TypeDefinition::Object(decl) => {
                    if decl.extends.is_some() {
                        self.lineage(&id)?;
                    }
                    decl.fields.iter().map(|f| f.declared.clone()).collect()
                }
                TypeDefinition::Alias(target) => vec![target],
                TypeDefinition::Enum(_) => Vec::new(),
            };
            for desc in referenced {
                if !self.can_handle(&desc) {
                    return Err(MarshalError::UnknownType(format!(
                        "{desc} (referenced by `{id}`)"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether a value of type `actual` may stand where `declared` is expected
    pub fn conforms(&self, actual: &TypeDescriptor, declared: &TypeDescriptor) -> bool {
        self.conforms_at(actual, declared, 0)
    }

    fn conforms_at(&self, actual: &TypeDescriptor, declared: &TypeDescriptor, depth: usize) -> bool {
        use TypeDescriptor::*;

        if declared.is_any() || actual == declared {
            return true;
        }
        if depth >= MAX_ALIAS_DEPTH {
            return false;
        }
        match (actual, declared) {
            (Named(id), _) if self.alias_target(id).is_some() => self
                .alias_target(id)
                .is_some_and(|target| self.conforms_at(&target, declared, depth + 1)),
            (_, Named(id)) if self.alias_target(id).is_some() => self
                .alias_target(id)
                .is_some_and(|target| self.conforms_at(actual, &target, depth + 1)),
            (List(_), List(_)) | (Set(_), Set(_)) | (Queue(_), Queue(_)) | (Map(_, _), Map(_, _)) => {
                true
            }
            (Named(id), Named(_)) => self
                .parent_of(id)
                .is_some_and(|parent| self.conforms_at(&Named(parent), declared, depth + 1)),
            _ => false,
        }
    }

    /// Declared parent of an object type
    pub fn parent_of(&self, id: &str) -> Option<String> {
        match self.definitions.get(id).map(|d| d.value().clone()) {
            Some(TypeDefinition::Object(decl)) => decl.extends.clone(),
            _ => None,
        }
    }

    /// Declarations from the root parent down to `id`
    fn lineage(&self, id: &str) -> MarshalResult<Vec<Arc<ObjectDeclaration>>> {
        let mut lineage = Vec::new();
        let mut current = id.to_string();
        loop {
            let decl = match self.definition(&current) {
                Some(TypeDefinition::Object(decl)) => decl,
                _ if current == id => return Err(MarshalError::UnknownType(current)),
                _ => {
                    return Err(MarshalError::UnknownType(format!(
                        "{current} (parent of `{id}` is not a registered object)"
                    )));
                }
            };
            let parent = decl.extends.clone();
            lineage.push(decl);
            match parent {
                None => break,
                Some(_) if lineage.len() >= MAX_ALIAS_DEPTH => {
                    return Err(MarshalError::UnknownType(format!(
                        "{id} (parent chain does not terminate)"
                    )));
                }
                Some(parent) => current = parent,
            }
        }
        lineage.reverse();
        Ok(lineage)
    }

    fn alias_target(&self, id: &str) -> Option<TypeDescriptor> {
        match self.definitions.get(id).map(|d| d.value().clone()) {
            Some(TypeDefinition::Alias(target)) => Some(target),
            _ => None,
        }
    }

    /// Field table of an object type, computed on first use
    ///
    /// Concurrent first uses may build the table more than once; every build
    /// is identical, so the last insert wins harmlessly.
    pub fn field_table(&self, id: &str) -> MarshalResult<Arc<FieldTable>> {
        if let Some(table) = self.field_tables.get(id) {
            return Ok(table.value().clone());
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let lineage = self.lineage(id)?;
        let table = Arc::new(FieldTable::build(id, &lineage));
        trace!(type_id = %id, fields = table.len(), "Field table computed");
        self.field_tables.insert(id.to_string(), table.clone());
        if self.generation.load(Ordering::SeqCst) != generation {
            self.field_tables.remove(id);
        }
        Ok(table)
    }

    /// Number of memoized field tables
    pub fn cached_field_tables(&self) -> usize {
        self.field_tables.len()
    }

    /// Decide how an instance of `id` will be built, or fail before any field is decoded
    pub fn instance_plan(&self, id: &str) -> MarshalResult<InstancePlan> {
        if let Some(factory) = self.factories.get(id) {
            return Ok(InstancePlan::Factory(factory.value().clone()));
        }
        match self.definition(id) {
            Some(TypeDefinition::Object(decl)) if decl.instantiation == Instantiation::Default => {
                Ok(InstancePlan::Default)
            }
            Some(TypeDefinition::Object(_)) => Err(MarshalError::NotInstantiable(id.to_string())),
            _ => Err(MarshalError::UnknownType(id.to_string())),
        }
    }

    /// Build a new instance of `id` from field values
    pub fn instantiate(&self, id: &str, fields: FieldValues) -> MarshalResult<ObjectRef> {
        let object = ObjectRef::new(id);
        self.instantiate_into(&object, fields)?;
        Ok(object)
    }

    /// Fill an already-allocated instance
    ///
    /// The decoder allocates instances before their fields so that
    /// back-references to a partially built object resolve.
    pub fn instantiate_into(&self, object: &ObjectRef, fields: FieldValues) -> MarshalResult<()> {
        let id = object.type_id();
        match self.instance_plan(id)? {
            InstancePlan::Factory(factory) => {
                let built = factory(fields)?;
                object.replace_fields(built);
            }
            InstancePlan::Default => {
                let table = self.field_table(id)?;
                let mut values = FieldValues::with_capacity(table.len());
                for field in table.fields() {
                    values.insert(field.name.clone(), default_value(&field.declared));
                }
                for (name, value) in fields {
                    values.insert(name, value);
                }
                object.replace_fields(values);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("definitions", &self.definitions.len())
            .field("factories", &self.factories.len())
            .field("strategies", &self.strategies.len())
            .field("field_tables", &self.field_tables.len())
            .finish()
    }
}

/// Value a default-constructed field starts with
pub fn default_value(declared: &TypeDescriptor) -> Value {
    match declared {
        TypeDescriptor::Bool => Value::Bool(false),
        TypeDescriptor::Int => Value::Int(0),
        TypeDescriptor::Long => Value::Long(0),
        TypeDescriptor::Float => Value::Float(0.0),
        TypeDescriptor::Double => Value::Double(0.0),
        TypeDescriptor::Char => Value::Char('\0'),
        _ => Value::Null,
    }
}
