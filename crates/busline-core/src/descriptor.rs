//! Type descriptors naming every marshallable shape
//!
//! A descriptor has a textual form shared by configuration files and the
//! wire (`EncodedType`, `ElementType`, ...):
//!
//! ```text
//! any | bool | int | long | float | double | char | string
//! biginteger | bigdecimal | timestamp | date | time | throwable
//! list<T> | set<T> | queue<T> | map<K,V>
//! <registered name>
//! ```

use crate::error::{MarshalError, MarshalResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifies a marshallable shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeDescriptor {
    /// Any value; the wire token describes itself
    #[default]
    Any,
    Bool,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    BigInteger,
    BigDecimal,
    /// Instant with nanosecond precision
    Timestamp,
    /// Calendar date without a time of day
    Date,
    /// Time of day without a date
    Time,
    Throwable,
    List(Box<TypeDescriptor>),
    Set(Box<TypeDescriptor>),
    Queue(Box<TypeDescriptor>),
    Map(Box<TypeDescriptor>, Box<TypeDescriptor>),
    /// An enum, object, or alias type registered under this id
    Named(String),
}

impl TypeDescriptor {
    /// Names reserved for builtin descriptors; registries refuse them as ids
    pub const BUILTIN_NAMES: &'static [&'static str] = &[
        "any",
        "bool",
        "int",
        "long",
        "float",
        "double",
        "char",
        "string",
        "biginteger",
        "bigdecimal",
        "timestamp",
        "date",
        "time",
        "throwable",
        "list",
        "set",
        "queue",
        "map",
    ];

    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(element))
    }

    pub fn set(element: TypeDescriptor) -> Self {
        TypeDescriptor::Set(Box::new(element))
    }

    pub fn queue(element: TypeDescriptor) -> Self {
        TypeDescriptor::Queue(Box::new(element))
    }

    pub fn map(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(key), Box::new(value))
    }

    pub fn named(id: impl Into<String>) -> Self {
        TypeDescriptor::Named(id.into())
    }

    /// Whether `name` collides with a builtin descriptor
    pub fn is_builtin_name(name: &str) -> bool {
        Self::BUILTIN_NAMES.contains(&name)
    }

    /// The head of the textual form, without type arguments
    ///
    /// This is what appears as `EncodedType` for builtin shapes.
    pub fn name(&self) -> &str {
        match self {
            TypeDescriptor::Any => "any",
            TypeDescriptor::Bool => "bool",
            TypeDescriptor::Int => "int",
            TypeDescriptor::Long => "long",
            TypeDescriptor::Float => "float",
            TypeDescriptor::Double => "double",
            TypeDescriptor::Char => "char",
            TypeDescriptor::String => "string",
            TypeDescriptor::BigInteger => "biginteger",
            TypeDescriptor::BigDecimal => "bigdecimal",
            TypeDescriptor::Timestamp => "timestamp",
            TypeDescriptor::Date => "date",
            TypeDescriptor::Time => "time",
            TypeDescriptor::Throwable => "throwable",
            TypeDescriptor::List(_) => "list",
            TypeDescriptor::Set(_) => "set",
            TypeDescriptor::Queue(_) => "queue",
            TypeDescriptor::Map(_, _) => "map",
            TypeDescriptor::Named(id) => id,
        }
    }

    /// Scalars may travel as bare JSON literals when the declared type is known
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Bool
                | TypeDescriptor::Int
                | TypeDescriptor::Long
                | TypeDescriptor::Float
                | TypeDescriptor::Double
                | TypeDescriptor::Char
                | TypeDescriptor::String
        )
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeDescriptor::Any)
    }

    /// Element descriptor of a list, set, or queue
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self {
            TypeDescriptor::List(e) | TypeDescriptor::Set(e) | TypeDescriptor::Queue(e) => Some(e),
            _ => None,
        }
    }

    /// All descriptors nested inside this one, including itself
    pub fn walk(&self) -> Vec<&TypeDescriptor> {
        let mut out = vec![self];
        match self {
            TypeDescriptor::List(e) | TypeDescriptor::Set(e) | TypeDescriptor::Queue(e) => {
                out.extend(e.walk());
            }
            TypeDescriptor::Map(k, v) => {
                out.extend(k.walk());
                out.extend(v.walk());
            }
            _ => {}
        }
        out
    }

    /// Build a builtin descriptor from its head and type arguments
    fn from_parts(head: &str, mut args: Vec<TypeDescriptor>) -> MarshalResult<Self> {
        let arity = |expected: usize, args: &Vec<TypeDescriptor>| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(MarshalError::malformed(format!(
                    "type `{head}` takes {expected} type argument(s), got {}",
                    args.len()
                )))
            }
        };

        let simple = match head {
            "any" => Some(TypeDescriptor::Any),
            "bool" => Some(TypeDescriptor::Bool),
            "int" => Some(TypeDescriptor::Int),
            "long" => Some(TypeDescriptor::Long),
            "float" => Some(TypeDescriptor::Float),
            "double" => Some(TypeDescriptor::Double),
            "char" => Some(TypeDescriptor::Char),
            "string" => Some(TypeDescriptor::String),
            "biginteger" => Some(TypeDescriptor::BigInteger),
            "bigdecimal" => Some(TypeDescriptor::BigDecimal),
            "timestamp" => Some(TypeDescriptor::Timestamp),
            "date" => Some(TypeDescriptor::Date),
            "time" => Some(TypeDescriptor::Time),
            "throwable" => Some(TypeDescriptor::Throwable),
            _ => None,
        };
        if let Some(desc) = simple {
            arity(0, &args)?;
            return Ok(desc);
        }

        match head {
            // A bare container head means a container of `any`
            "list" | "set" | "queue" if args.is_empty() => {
                args.push(TypeDescriptor::Any);
                Self::from_parts(head, args)
            }
            "map" if args.is_empty() => Ok(TypeDescriptor::map(TypeDescriptor::Any, TypeDescriptor::Any)),
            "list" | "set" | "queue" => {
                arity(1, &args)?;
                let element = args.remove(0);
                Ok(match head {
                    "list" => TypeDescriptor::list(element),
                    "set" => TypeDescriptor::set(element),
                    _ => TypeDescriptor::queue(element),
                })
            }
            "map" => {
                arity(2, &args)?;
                let value = args.remove(1);
                let key = args.remove(0);
                Ok(TypeDescriptor::map(key, value))
            }
            _ => {
                arity(0, &args)?;
                Ok(TypeDescriptor::Named(head.to_string()))
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::List(e) | TypeDescriptor::Set(e) | TypeDescriptor::Queue(e) => {
                write!(f, "{}<{}>", self.name(), e)
            }
            TypeDescriptor::Map(k, v) => write!(f, "map<{},{}>", k, v),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = MarshalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = DescriptorParser { input: s, pos: 0 };
        let desc = parser.descriptor()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(desc)
    }
}

/// Recursive-descent parser over the textual descriptor form
struct DescriptorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl DescriptorParser<'_> {
    fn descriptor(&mut self) -> MarshalResult<TypeDescriptor> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '<' || c == '>' || c == ',' || c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
        let head = &self.input[start..self.pos];
        if head.is_empty() {
            return Err(self.error("expected a type name"));
        }

        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                args.push(self.descriptor()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.error("expected `,` or `>`")),
                }
            }
        }

        TypeDescriptor::from_parts(head, args)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, message: &str) -> MarshalError {
        MarshalError::malformed(format!(
            "invalid type descriptor `{}` at offset {}: {}",
            self.input, self.pos, message
        ))
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
