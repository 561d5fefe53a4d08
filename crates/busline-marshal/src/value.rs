//! Dynamic value model traversed by the graph walker
//!
//! Objects are shared handles ([`ObjectRef`]) so that identity, sharing and
//! cycles survive a round trip. Every other variant is a plain value.

use bigdecimal::BigDecimal;
use busline_core::TypeDescriptor;
use indexmap::IndexMap;
use num_bigint::BigInt;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use time::{Date, OffsetDateTime, Time};

/// Field name to value map of one object
pub type FieldValues = IndexMap<String, Value>;

/// Pairs of object addresses already assumed equal during a comparison
type SeenPairs = HashSet<(usize, usize)>;

/// A marshallable value
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    BigInteger(BigInt),
    BigDecimal(BigDecimal),
    Timestamp(OffsetDateTime),
    Date(Date),
    Time(Time),
    Enum(EnumValue),
    Collection(CollectionValue),
    Map(MapValue),
    Object(ObjectRef),
    Throwable(ThrowableValue),
}

impl Value {
    /// The descriptor this value resolves to at runtime
    pub fn descriptor(&self) -> TypeDescriptor {
        match self {
            Value::Null => TypeDescriptor::Any,
            Value::Bool(_) => TypeDescriptor::Bool,
            Value::Int(_) => TypeDescriptor::Int,
            Value::Long(_) => TypeDescriptor::Long,
            Value::Float(_) => TypeDescriptor::Float,
            Value::Double(_) => TypeDescriptor::Double,
            Value::Char(_) => TypeDescriptor::Char,
            Value::String(_) => TypeDescriptor::String,
            Value::BigInteger(_) => TypeDescriptor::BigInteger,
            Value::BigDecimal(_) => TypeDescriptor::BigDecimal,
            Value::Timestamp(_) => TypeDescriptor::Timestamp,
            Value::Date(_) => TypeDescriptor::Date,
            Value::Time(_) => TypeDescriptor::Time,
            Value::Enum(e) => TypeDescriptor::named(e.type_id()),
            Value::Collection(c) => c.descriptor(),
            Value::Map(m) => m.descriptor(),
            Value::Object(o) => TypeDescriptor::named(o.type_id()),
            Value::Throwable(_) => TypeDescriptor::Throwable,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral value widened to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i64::from(*i)),
            Value::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Floating value widened to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f64::from(*f)),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionValue> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_throwable(&self) -> Option<&ThrowableValue> {
        match self {
            Value::Throwable(t) => Some(t),
            _ => None,
        }
    }

    fn graph_eq(&self, other: &Value, seen: &mut SeenPairs) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            // Bit patterns, so NaN and signed zero round trips are observable
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::BigInteger(a), Value::BigInteger(b)) => a == b,
            (Value::BigDecimal(a), Value::BigDecimal(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Throwable(a), Value::Throwable(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => a.graph_eq(b, seen),
            (Value::Map(a), Value::Map(b)) => a.graph_eq(b, seen),
            (Value::Object(a), Value::Object(b)) => a.graph_eq(b, seen),
            _ => false,
        }
    }
}

/// Structural, cycle-aware equality
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.graph_eq(other, &mut SeenPairs::new())
    }
}

/// Find an element of `candidates` equal to `needle` without leaking failed assumptions
fn find_equal<'a>(
    needle: &Value,
    candidates: impl Iterator<Item = &'a Value>,
    seen: &mut SeenPairs,
) -> bool {
    for candidate in candidates {
        let mut trial = seen.clone();
        if needle.graph_eq(candidate, &mut trial) {
            *seen = trial;
            return true;
        }
    }
    false
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => String,
    BigInt => BigInteger,
    BigDecimal => BigDecimal,
    OffsetDateTime => Timestamp,
    Date => Date,
    Time => Time,
    EnumValue => Enum,
    CollectionValue => Collection,
    MapValue => Map,
    ObjectRef => Object,
    ThrowableValue => Throwable,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A constant of a registered enum, carried by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    type_id: String,
    constant: String,
}

impl EnumValue {
    pub fn new(type_id: impl Into<String>, constant: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            constant: constant.into(),
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn constant(&self) -> &str {
        &self.constant
    }
}

/// Shape of a builtin collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    List,
    Set,
    Queue,
}

impl CollectionKind {
    /// Ordered kinds compare element by element; sets ignore order
    pub fn is_ordered(&self) -> bool {
        !matches!(self, CollectionKind::Set)
    }

    /// Builtin descriptor of this kind with the given element type
    pub fn descriptor(&self, element: TypeDescriptor) -> TypeDescriptor {
        match self {
            CollectionKind::List => TypeDescriptor::list(element),
            CollectionKind::Set => TypeDescriptor::set(element),
            CollectionKind::Queue => TypeDescriptor::queue(element),
        }
    }

    /// Kind of a builtin collection descriptor
    pub fn of(desc: &TypeDescriptor) -> Option<Self> {
        match desc {
            TypeDescriptor::List(_) => Some(CollectionKind::List),
            TypeDescriptor::Set(_) => Some(CollectionKind::Set),
            TypeDescriptor::Queue(_) => Some(CollectionKind::Queue),
            _ => None,
        }
    }
}

/// A list, set, or queue
///
/// Sets keep their members unique by value equality on every insertion.
/// `type_name` records a registered subtype (e.g. `CustomList`); it is part
/// of the wire form but not of equality.
#[derive(Debug, Clone)]
pub struct CollectionValue {
    kind: CollectionKind,
    type_name: Option<String>,
    element: TypeDescriptor,
    items: Vec<Value>,
}

impl CollectionValue {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            type_name: None,
            element: TypeDescriptor::Any,
            items: Vec::new(),
        }
    }

    pub fn list(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::new(CollectionKind::List).with_items(items)
    }

    pub fn set(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::new(CollectionKind::Set).with_items(items)
    }

    pub fn queue(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Self::new(CollectionKind::Queue).with_items(items)
    }

    /// Set the element descriptor carried on the wire
    pub fn with_element(mut self, element: TypeDescriptor) -> Self {
        self.element = element;
        self
    }

    /// Mark this collection as an instance of a registered subtype
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    fn with_items(mut self, items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        for item in items {
            self.push(item.into());
        }
        self
    }

    /// Append an item; a set ignores an item equal to an existing member
    ///
    /// Returns whether the item was added.
    pub fn push(&mut self, item: Value) -> bool {
        if self.kind == CollectionKind::Set && self.items.iter().any(|v| *v == item) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn element(&self) -> &TypeDescriptor {
        &self.element
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &Value) -> bool {
        self.items.iter().any(|v| v == item)
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        match &self.type_name {
            Some(name) => TypeDescriptor::named(name.clone()),
            None => self.kind.descriptor(self.element.clone()),
        }
    }

    fn graph_eq(&self, other: &CollectionValue, seen: &mut SeenPairs) -> bool {
        if self.kind.is_ordered() != other.kind.is_ordered() || self.len() != other.len() {
            return false;
        }
        if self.kind.is_ordered() {
            self.items
                .iter()
                .zip(&other.items)
                .all(|(a, b)| a.graph_eq(b, seen))
        } else {
            self.items
                .iter()
                .all(|a| find_equal(a, other.items.iter(), seen))
        }
    }
}

impl PartialEq for CollectionValue {
    fn eq(&self, other: &Self) -> bool {
        self.graph_eq(other, &mut SeenPairs::new())
    }
}

/// A map with unique keys under value equality
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    type_name: Option<String>,
    key: TypeDescriptor,
    value: TypeDescriptor,
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key and value descriptors carried on the wire
    pub fn with_types(mut self, key: TypeDescriptor, value: TypeDescriptor) -> Self {
        self.key = key;
        self.value = value;
        self
    }

    /// Mark this map as an instance of a registered subtype
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Builder form of [`MapValue::insert`]
    pub fn with_entry(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    /// Insert an entry; an equal key is overwritten and its old value returned
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn key_type(&self) -> &TypeDescriptor {
        &self.key
    }

    pub fn value_type(&self) -> &TypeDescriptor {
        &self.value
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        match &self.type_name {
            Some(name) => TypeDescriptor::named(name.clone()),
            None => TypeDescriptor::map(self.key.clone(), self.value.clone()),
        }
    }

    fn graph_eq(&self, other: &MapValue, seen: &mut SeenPairs) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.entries.iter().all(|(k, v)| {
            other.entries.iter().any(|(ok, ov)| {
                let mut trial = seen.clone();
                if k.graph_eq(ok, &mut trial) && v.graph_eq(ov, &mut trial) {
                    *seen = trial;
                    true
                } else {
                    false
                }
            })
        })
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.graph_eq(other, &mut SeenPairs::new())
    }
}

struct ObjectCell {
    type_id: String,
    fields: RwLock<FieldValues>,
}

/// Shared handle to an object instance
///
/// Cloning the handle shares the instance; identity is pointer identity.
/// Graphs that reference themselves form `Arc` cycles and are only freed once
/// a field in the cycle is cleared.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectCell>);

impl ObjectRef {
    /// Create an instance with no fields set
    pub fn new(type_id: impl Into<String>) -> Self {
        Self(Arc::new(ObjectCell {
            type_id: type_id.into(),
            fields: RwLock::new(FieldValues::new()),
        }))
    }

    /// Builder form of [`ObjectRef::set`]
    pub fn with_field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn type_id(&self) -> &str {
        &self.0.type_id
    }

    /// Current value of a field; unset fields read as `None`
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.fields.read().get(name).cloned()
    }

    /// Set a field, returning its previous value
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.fields.write().insert(name.into(), value.into())
    }

    /// Replace every field at once
    pub fn replace_fields(&self, fields: FieldValues) {
        *self.0.fields.write() = fields;
    }

    /// Copy of the current fields
    pub fn fields(&self) -> FieldValues {
        self.0.fields.read().clone()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.0.fields.read().keys().cloned().collect()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address identifying this instance while it is alive
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Unset fields compare equal to explicit nulls
    fn graph_eq(&self, other: &ObjectRef, seen: &mut SeenPairs) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if !seen.insert((self.identity(), other.identity())) {
            return true;
        }
        if self.type_id() != other.type_id() {
            return false;
        }

        let left = self.fields();
        let right = other.fields();
        let names: HashSet<&String> = left.keys().chain(right.keys()).collect();
        names.into_iter().all(|name| {
            let a = left.get(name).unwrap_or(&Value::Null);
            let b = right.get(name).unwrap_or(&Value::Null);
            a.graph_eq(b, seen)
        })
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.graph_eq(other, &mut SeenPairs::new())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Field values are not printed: they may lead back to this object
        write!(
            f,
            "ObjectRef({}@{:#x} {:?})",
            self.type_id(),
            self.identity(),
            self.field_names()
        )
    }
}

/// One frame of a captured stack trace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackFrame {
    pub declaring_class: String,
    pub method_name: String,
    pub file_name: Option<String>,
    pub line_number: i32,
}

impl StackFrame {
    pub fn new(
        declaring_class: impl Into<String>,
        method_name: impl Into<String>,
        file_name: impl Into<String>,
        line_number: i32,
    ) -> Self {
        Self {
            declaring_class: declaring_class.into(),
            method_name: method_name.into(),
            file_name: Some(file_name.into()),
            line_number,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {}.{}({}:{})",
            self.declaring_class,
            self.method_name,
            self.file_name.as_deref().unwrap_or("Unknown Source"),
            self.line_number
        )
    }
}

/// A transported error: type name, message, cause chain, and stack trace
///
/// The decoding side rebuilds this value whatever the original error type
/// was; `error_type` keeps the original name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowableValue {
    error_type: String,
    message: Option<String>,
    cause: Option<Box<ThrowableValue>>,
    stack_trace: Vec<StackFrame>,
}

impl ThrowableValue {
    pub fn new(error_type: impl Into<String>, message: Option<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message,
            cause: None,
            stack_trace: Vec::new(),
        }
    }

    pub fn with_cause(mut self, cause: ThrowableValue) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_stack_trace(mut self, frames: Vec<StackFrame>) -> Self {
        self.stack_trace = frames;
        self
    }

    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause(&self) -> Option<&ThrowableValue> {
        self.cause.as_deref()
    }

    pub fn stack_trace(&self) -> &[StackFrame] {
        &self.stack_trace
    }

    /// Length of the cause chain, this error included
    pub fn chain_len(&self) -> usize {
        1 + self.cause().map_or(0, ThrowableValue::chain_len)
    }
}

impl fmt::Display for ThrowableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.error_type, message),
            None => f.write_str(&self.error_type),
        }
    }
}

impl std::error::Error for ThrowableValue {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}
