//! Runtime values consumed by the narrowing engine and the default resolver.
//!
//! The model is the JavaScript value space the schemas describe: objects keep
//! insertion order, and functions are opaque apart from their arity.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::types::{LiteralValue, Name};

pub type ObjectMap = IndexMap<Name, Value>;

/// An opaque callable. `arity` is the number of declared parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionValue {
    pub name: Option<Name>,
    pub arity: usize,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Array(Vec<Value>),
    Object(ObjectMap),
    Function(FunctionValue),
}

/// Result of the `typeof` operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeofKind {
    Undefined,
    Object,
    Boolean,
    Number,
    String,
    Function,
}

impl Value {
    pub fn object<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (Arc::from(key.as_ref()), value))
                .collect(),
        )
    }

    pub fn empty_object() -> Value {
        Value::Object(ObjectMap::new())
    }

    pub fn function(name: &str, arity: usize) -> Value {
        Value::Function(FunctionValue {
            name: Some(Arc::from(name)),
            arity,
        })
    }

    pub fn string(value: &str) -> Value {
        Value::String(Arc::from(value))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_object(&self) -> Option<&ObjectMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Property read. Non-objects and missing keys read as `None`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(name))
    }

    /// Property read that treats an explicit `undefined` like a missing key,
    /// the way `(pet as Bird).fly !== undefined` does.
    pub fn get_defined(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|value| !value.is_undefined())
    }

    pub fn type_of(&self) -> TypeofKind {
        match self {
            Value::Undefined => TypeofKind::Undefined,
            Value::Null | Value::Array(_) | Value::Object(_) => TypeofKind::Object,
            Value::Bool(_) => TypeofKind::Boolean,
            Value::Number(_) => TypeofKind::Number,
            Value::String(_) => TypeofKind::String,
            Value::Function(_) => TypeofKind::Function,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Strict equality against a literal type.
    pub fn matches_literal(&self, literal: &LiteralValue) -> bool {
        match (self, literal) {
            (Value::String(a), LiteralValue::String(b)) => a == b,
            (Value::Number(a), LiteralValue::Number(b)) => a == b,
            (Value::Bool(a), LiteralValue::Boolean(b)) => a == b,
            _ => false,
        }
    }

    /// Short description of the value's kind for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<serde_json::Value> for Value {
    /// JSON has no `undefined` or functions, so the conversion never produces
    /// them. Numbers outside `f64` range saturate the way `JSON.parse` does.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(Arc::from(s)),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (Arc::from(key), Value::from(value)))
                    .collect(),
            ),
        }
    }
}
