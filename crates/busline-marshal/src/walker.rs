//! Graph walker driving one marshal or unmarshal pass

use crate::reference::ReferenceTable;
use crate::registry::TypeRegistry;
use crate::strategy::{ENCODED_TYPE, REF, TypeSite, scalar};
use crate::value::Value;
use busline_core::{MarshalError, MarshalResult, TypeDescriptor, WalkState};
use serde_json::{Map, Value as Json};
use std::fmt;
use tracing::{debug, trace};

/// Location inside the graph, rendered as `Order.lines[2].product`
#[derive(Debug, Clone, Default)]
pub struct FieldPath {
    root: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Field(String),
    Index(usize),
}

impl FieldPath {
    fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

/// Drives strategies over one value tree
///
/// A walker is single-use: it owns the reference table of exactly one pass
/// and refuses to run again once it reached [`WalkState::Done`] or
/// [`WalkState::Failed`].
pub struct GraphWalker<'r> {
    registry: &'r TypeRegistry,
    state: WalkState,
    refs: ReferenceTable,
    path: FieldPath,
}

impl<'r> GraphWalker<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            state: WalkState::NotStarted,
            refs: ReferenceTable::new(),
            path: FieldPath::default(),
        }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Reference table of the current pass
    pub fn references(&mut self) -> &mut ReferenceTable {
        &mut self.refs
    }

    /// Current location, for error messages
    pub fn path(&self) -> String {
        self.path.to_string()
    }

    /// Encode a whole value tree into a token tree
    pub fn marshal(&mut self, value: &Value, declared: &TypeDescriptor) -> MarshalResult<Json> {
        self.begin(value.descriptor().name())?;
        let result = self.encode_value(value, declared);
        self.finish("marshal", &result);
        result
    }

    /// Decode a whole token tree into a value tree
    pub fn unmarshal(&mut self, token: &Json, declared: &TypeDescriptor) -> MarshalResult<Value> {
        self.begin(root_label(token, declared))?;
        let result = self.decode_value(token, declared);
        self.finish("unmarshal", &result);
        result
    }

    fn begin(&mut self, root: &str) -> MarshalResult<()> {
        if !self.state.can_transition_to(WalkState::InProgress) {
            return Err(MarshalError::InvalidState {
                expected: WalkState::NotStarted.to_string(),
                actual: self.state.to_string(),
            });
        }
        self.state = WalkState::InProgress;
        self.path.root = root.to_string();
        Ok(())
    }

    fn finish<T>(&mut self, pass: &str, result: &MarshalResult<T>) {
        self.state = match result {
            Ok(_) => WalkState::Done,
            Err(_) => WalkState::Failed,
        };
        match result {
            Ok(_) => debug!(pass, root = %self.path.root, objects = self.refs.len(), state = %self.state, "Pass finished"),
            Err(e) => debug!(pass, root = %self.path.root, state = %self.state, error = %e, "Pass aborted"),
        }
    }

    /// Encode one value expected to be of type `declared`
    pub fn encode_value(&mut self, value: &Value, declared: &TypeDescriptor) -> MarshalResult<Json> {
        if value.is_null() {
            return Ok(Json::Null);
        }

        if let Value::Object(object) = value
            && let Some(id) = self.refs.lookup(object)
        {
            let mut token = Map::new();
            token.insert(REF.to_string(), Json::String(id.to_string()));
            return Ok(Json::Object(token));
        }

        let actual = value.descriptor();
        if actual.is_scalar() && actual == *declared {
            return scalar::encode_literal(value, self);
        }
        if !self.registry.conforms(&actual, declared) {
            return Err(MarshalError::unsupported(
                format!("{actual} where {declared} is declared"),
                self.path(),
            ));
        }

        let resolved = self.registry.resolve(&actual).map_err(|e| match e {
            MarshalError::UnknownType(type_name) => MarshalError::unsupported(type_name, self.path()),
            other => other,
        })?;
        trace!(encoded = %actual, shape = %resolved.shape, path = %self.path, "Encoding");
        let site = TypeSite {
            encoded: &actual,
            shape: &resolved.shape,
            declared,
        };
        resolved.strategy.encode(value, &site, self)
    }

    /// Decode one token expected to be of type `declared`
    pub fn decode_value(&mut self, token: &Json, declared: &TypeDescriptor) -> MarshalResult<Value> {
        let fields = match token {
            Json::Null => return Ok(Value::Null),
            Json::Object(fields) => fields,
            Json::Array(_) => {
                return Err(MarshalError::malformed(format!(
                    "untyped array at `{}`",
                    self.path
                )));
            }
            literal => return self.decode_literal(literal, declared),
        };

        if let Some(id) = fields.get(REF) {
            let id = id
                .as_str()
                .ok_or_else(|| MarshalError::malformed("`^ref` must be a string"))?;
            let object = self.refs.resolve(id)?;
            let actual = TypeDescriptor::named(object.type_id());
            if !self.registry.conforms(&actual, declared) {
                return Err(MarshalError::malformed(format!(
                    "reference `{id}` at `{}` is a `{actual}` where `{declared}` is declared",
                    self.path
                )));
            }
            return Ok(Value::Object(object));
        }

        let encoded: TypeDescriptor = match fields.get(ENCODED_TYPE) {
            Some(Json::String(text)) => text.parse()?,
            _ => {
                return Err(MarshalError::malformed(format!(
                    "object at `{}` has no `{ENCODED_TYPE}`",
                    self.path
                )));
            }
        };
        let resolved = self.registry.resolve(&encoded)?;
        if !self.registry.conforms(&encoded, declared) {
            return Err(MarshalError::malformed(format!(
                "`{encoded}` found at `{}` where `{declared}` is declared",
                self.path
            )));
        }
        trace!(encoded = %encoded, shape = %resolved.shape, path = %self.path, "Decoding");
        let site = TypeSite {
            encoded: &encoded,
            shape: &resolved.shape,
            declared,
        };
        resolved.strategy.decode(fields, &site, self)
    }

    fn decode_literal(&self, literal: &Json, declared: &TypeDescriptor) -> MarshalResult<Value> {
        if declared.is_any() {
            return scalar::infer_literal(literal, self);
        }
        if declared.is_scalar() {
            return scalar::decode_literal(literal, declared, self);
        }
        Err(MarshalError::malformed(format!(
            "bare literal {literal} at `{}` where `{declared}` is declared",
            self.path
        )))
    }

    /// Run `f` one named segment deeper, for payloads a strategy walks itself
    pub fn descend<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Self) -> MarshalResult<T>,
    ) -> MarshalResult<T> {
        self.path.push(Segment::Field(name.to_string()));
        let result = f(self);
        self.path.pop();
        result
    }

    /// Encode a named field of the current value
    pub fn encode_field(
        &mut self,
        name: &str,
        value: &Value,
        declared: &TypeDescriptor,
    ) -> MarshalResult<Json> {
        self.path.push(Segment::Field(name.to_string()));
        let result = self.encode_value(value, declared);
        self.path.pop();
        result
    }

    /// Encode the `index`th element of the current container
    pub fn encode_element(
        &mut self,
        index: usize,
        value: &Value,
        declared: &TypeDescriptor,
    ) -> MarshalResult<Json> {
        self.path.push(Segment::Index(index));
        let result = self.encode_value(value, declared);
        self.path.pop();
        result
    }

    pub fn decode_field(
        &mut self,
        name: &str,
        token: &Json,
        declared: &TypeDescriptor,
    ) -> MarshalResult<Value> {
        self.path.push(Segment::Field(name.to_string()));
        let result = self.decode_value(token, declared);
        self.path.pop();
        result
    }

    pub fn decode_element(
        &mut self,
        index: usize,
        token: &Json,
        declared: &TypeDescriptor,
    ) -> MarshalResult<Value> {
        self.path.push(Segment::Index(index));
        let result = self.decode_value(token, declared);
        self.path.pop();
        result
    }
}

/// Root label for decode paths: the wire type if present, else the declared type
fn root_label<'t>(token: &'t Json, declared: &'t TypeDescriptor) -> &'t str {
    token
        .get(ENCODED_TYPE)
        .and_then(Json::as_str)
        .unwrap_or_else(|| declared.name())
}

impl fmt::Debug for GraphWalker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphWalker")
            .field("state", &self.state)
            .field("path", &self.path.to_string())
            .field("references", &self.refs.len())
            .finish()
    }
}
