//! Checking a runtime value against a type tag.

use std::fmt;

use shapecheck_common::CheckerOptions;
use shapecheck_common::limits::MAX_CONFORMANCE_DEPTH;

use crate::schema::ShapeDescriptor;
use crate::types::{IntrinsicKind, TypeTag};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum ViolationKind {
    MissingField,
    TypeMismatch { expected: TypeTag, found: &'static str },
    DepthExceeded,
}

/// Where and how a value departs from its expected type. `path` is dotted,
/// with array elements as `[i]`; empty means the value itself.
#[derive(Clone, Debug, PartialEq)]
pub struct ConformanceViolation {
    pub path: String,
    pub kind: ViolationKind,
}

impl fmt::Display for ConformanceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<value>" } else { &self.path };
        match &self.kind {
            ViolationKind::MissingField => write!(f, "required field `{}` is missing", path),
            ViolationKind::TypeMismatch { expected, found } => {
                write!(f, "`{}` is {} but '{}' is expected", path, found, expected)
            }
            ViolationKind::DepthExceeded => write!(f, "`{}` is nested too deeply to check", path),
        }
    }
}

/// Does `value` conform to `tag`?
///
/// Named applications (`Promise<string>`, `Date`) are opaque at runtime:
/// any object or function is accepted for them.
pub fn conforms(
    value: &Value,
    tag: &TypeTag,
    options: &CheckerOptions,
) -> Result<(), ConformanceViolation> {
    ConformanceWalker {
        options,
        path: String::new(),
        depth: 0,
    }
    .check(value, tag)
}

/// Shorthand for conformance against a shape.
pub fn conforms_to_shape(
    value: &Value,
    shape: &ShapeDescriptor,
    options: &CheckerOptions,
) -> Result<(), ConformanceViolation> {
    ConformanceWalker {
        options,
        path: String::new(),
        depth: 0,
    }
    .check_shape(value, shape)
}

struct ConformanceWalker<'a> {
    options: &'a CheckerOptions,
    path: String,
    depth: u32,
}

impl ConformanceWalker<'_> {
    fn violation(&self, kind: ViolationKind) -> ConformanceViolation {
        ConformanceViolation {
            path: self.path.clone(),
            kind,
        }
    }

    fn mismatch(&self, expected: &TypeTag, value: &Value) -> ConformanceViolation {
        self.violation(ViolationKind::TypeMismatch {
            expected: expected.clone(),
            found: value.kind_name(),
        })
    }

    fn check(&mut self, value: &Value, tag: &TypeTag) -> Result<(), ConformanceViolation> {
        use IntrinsicKind as K;

        if self.depth >= self.options.max_depth.min(MAX_CONFORMANCE_DEPTH) {
            return Err(self.violation(ViolationKind::DepthExceeded));
        }

        if !self.options.strict_null_checks && matches!(value, Value::Null | Value::Undefined) {
            return Ok(());
        }

        let ok = match (tag, value) {
            (TypeTag::Intrinsic(K::Any | K::Unknown), _) => true,
            (TypeTag::Intrinsic(K::Never), _) => false,
            (TypeTag::Intrinsic(K::String), Value::String(_)) => true,
            (TypeTag::Intrinsic(K::Number), Value::Number(_)) => true,
            (TypeTag::Intrinsic(K::Boolean), Value::Bool(_)) => true,
            (TypeTag::Intrinsic(K::Null), Value::Null) => true,
            (TypeTag::Intrinsic(K::Undefined | K::Void), Value::Undefined) => true,
            (TypeTag::Literal(literal), _) => value.matches_literal(literal),
            (TypeTag::Union(union), _) => {
                // First member that accepts the value wins; report against the
                // whole union otherwise.
                let saved = self.path.len();
                union.members().iter().any(|member| {
                    let result = self.check(value, member);
                    self.path.truncate(saved);
                    result.is_ok()
                })
            }
            (TypeTag::Shape(shape), Value::Object(_)) => {
                self.depth += 1;
                let result = self.check_shape(value, shape);
                self.depth -= 1;
                return result;
            }
            (TypeTag::Array(element), Value::Array(items)) => {
                self.depth += 1;
                let saved = self.path.len();
                for (i, item) in items.iter().enumerate() {
                    self.path.push_str(&format!("[{}]", i));
                    let result = self.check(item, element);
                    if result.is_err() {
                        self.depth -= 1;
                        return result;
                    }
                    self.path.truncate(saved);
                }
                self.depth -= 1;
                true
            }
            // A runtime function of arity n can be called with any argument list
            // that supplies at least n arguments.
            (TypeTag::Function(signature), Value::Function(function)) => {
                function.arity <= signature.params().len()
            }
            (TypeTag::Application(_), Value::Object(_) | Value::Function(_)) => true,
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(self.mismatch(tag, value))
        }
    }

    fn check_shape(
        &mut self,
        value: &Value,
        shape: &ShapeDescriptor,
    ) -> Result<(), ConformanceViolation> {
        let Some(map) = value.as_object() else {
            return Err(self.mismatch(&TypeTag::shape(shape.clone()), value));
        };

        let saved = self.path.len();
        for field in shape.fields() {
            if !self.path.is_empty() {
                self.path.push('.');
            }
            self.path.push_str(&field.name);

            match map.get(&field.name) {
                None if field.is_optional() => {}
                None => return Err(self.violation(ViolationKind::MissingField)),
                Some(Value::Undefined)
                    if field.is_optional() && !self.options.exact_optional_property_types => {}
                Some(field_value) => self.check(field_value, &field.value_kind)?,
            }
            self.path.truncate(saved);
        }
        Ok(())
    }
}
