//! Weakly-typed collector configuration tree
//!
//! A collector's `receivers:`/`exporters:` entries only have a known shape per
//! component type, so they are kept as a generic tree. Every accessor reports
//! a missing key and a wrong-typed value as distinct outcomes ([`Lookup`]);
//! callers decide whether a wrong type is worth a log line, but nothing in
//! here ever panics on unexpected shapes.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Keyed children of a mapping node
pub type Mapping = BTreeMap<String, ConfigValue>;

/// One node of the configuration tree
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// `null`, `~` or an empty value
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Integer(i64),
    /// Floating point scalar
    Float(f64),
    /// String scalar
    String(String),
    /// Sequence of nodes
    Sequence(Vec<ConfigValue>),
    /// Mapping of string keys to nodes
    Mapping(Mapping),
}

/// Discriminant of a [`ConfigValue`], used in wrong-type reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// Null node
    Null,
    /// Boolean node
    Bool,
    /// Integer node
    Integer,
    /// Float node
    Float,
    /// String node
    String,
    /// Sequence node
    Sequence,
    /// Mapping node
    Mapping,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        };
        f.write_str(s)
    }
}

/// Outcome of a typed lookup into the tree
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup<T> {
    /// The key isn't there (or the parent isn't a mapping at all)
    Missing,
    /// The key is there but holds a different kind of node
    WrongType {
        /// Kind the caller asked for
        expected: ValueKind,
        /// Kind actually found
        found: ValueKind,
    },
    /// The key holds a node of the requested kind
    Found(T),
}

impl<T> Lookup<T> {
    /// Collapse to an `Option`, treating a wrong type as absent
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::Missing | Lookup::WrongType { .. } => None,
        }
    }

    /// True if the key is not present
    pub fn is_missing(&self) -> bool {
        matches!(self, Lookup::Missing)
    }

    /// Map the found value, keeping missing/wrong-type outcomes
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::Missing => Lookup::Missing,
            Lookup::WrongType { expected, found } => Lookup::WrongType { expected, found },
        }
    }
}

impl ConfigValue {
    /// Kind of this node
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Null => ValueKind::Null,
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Integer(_) => ValueKind::Integer,
            ConfigValue::Float(_) => ValueKind::Float,
            ConfigValue::String(_) => ValueKind::String,
            ConfigValue::Sequence(_) => ValueKind::Sequence,
            ConfigValue::Mapping(_) => ValueKind::Mapping,
        }
    }

    /// True for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// String contents, if this is a string node
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean contents, if this is a bool node
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer contents, if this is an integer node
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Children, if this is a mapping node
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Elements, if this is a sequence node
    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a child by key
    ///
    /// Asking a non-mapping node for a key reports `Missing`: there is no
    /// such key, whatever the node holds.
    pub fn get(&self, key: &str) -> Lookup<&ConfigValue> {
        match self.as_mapping().and_then(|m| m.get(key)) {
            Some(v) => Lookup::Found(v),
            None => Lookup::Missing,
        }
    }

    /// Look up a string child
    pub fn str_field(&self, key: &str) -> Lookup<&str> {
        match self.get(key) {
            Lookup::Found(ConfigValue::String(s)) => Lookup::Found(s.as_str()),
            Lookup::Found(other) => Lookup::WrongType {
                expected: ValueKind::String,
                found: other.kind(),
            },
            Lookup::Missing => Lookup::Missing,
            Lookup::WrongType { expected, found } => Lookup::WrongType { expected, found },
        }
    }

    /// Look up a mapping child
    pub fn mapping_field(&self, key: &str) -> Lookup<&Mapping> {
        match self.get(key) {
            Lookup::Found(ConfigValue::Mapping(m)) => Lookup::Found(m),
            Lookup::Found(other) => Lookup::WrongType {
                expected: ValueKind::Mapping,
                found: other.kind(),
            },
            Lookup::Missing => Lookup::Missing,
            Lookup::WrongType { expected, found } => Lookup::WrongType { expected, found },
        }
    }

    /// Look up a sequence child
    pub fn sequence_field(&self, key: &str) -> Lookup<&[ConfigValue]> {
        match self.get(key) {
            Lookup::Found(ConfigValue::Sequence(s)) => Lookup::Found(s.as_slice()),
            Lookup::Found(other) => Lookup::WrongType {
                expected: ValueKind::Sequence,
                found: other.kind(),
            },
            Lookup::Missing => Lookup::Missing,
            Lookup::WrongType { expected, found } => Lookup::WrongType { expected, found },
        }
    }

    /// Descend through nested mappings, e.g. `["service", "telemetry", "metrics"]`
    pub fn path(&self, keys: &[&str]) -> Option<&ConfigValue> {
        keys.iter().try_fold(self, |node, key| node.get(key).found())
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<Mapping> for ConfigValue {
    fn from(m: Mapping) -> Self {
        ConfigValue::Mapping(m)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(s: Vec<ConfigValue>) -> Self {
        ConfigValue::Sequence(s)
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => n.as_f64().map(ConfigValue::Float).unwrap_or_default(),
            },
            Value::String(s) => ConfigValue::String(s),
            Value::Array(arr) => {
                ConfigValue::Sequence(arr.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(obj) => ConfigValue::Mapping(
                obj.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}
