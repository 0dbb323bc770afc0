//! Default cascades: filling in omitted fields and objects.
//!
//! A cascade mirrors a shape and carries two kinds of defaults:
//!
//! ```typescript
//! function f1({ a, b = 0 } = { a: "foo" }) { ... }   // object-level + field-level
//! function f2({ a, b }: { a: string; b?: number }) { ... }
//! ```
//!
//! The object-level default is used only when the whole argument is absent
//! (or `undefined`). An explicitly supplied `{}` does not fall back to it, so
//! `f({})` fails on a required field that `f()` gets from the object default.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{Level, span, trace};

use shapecheck_common::CheckerOptions;
use shapecheck_common::limits::MAX_CASCADE_DEPTH;

use crate::conformance::conforms;
use crate::errors::{DefaultsError, InvalidSchemaKind, SchemaError};
use crate::schema::{FieldDescriptor, ShapeDescriptor};
use crate::subtype::is_assignable;
use crate::types::{Name, TypeTag};
use crate::value::{ObjectMap, Value};

/// Default for one field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldDefault {
    /// Substituted as is when the field is absent.
    Value(Value),
    /// Resolved recursively, whether the field is supplied or not.
    Cascade(DefaultCascade),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DefaultCascade {
    shape: Arc<ShapeDescriptor>,
    object_default: Option<Value>,
    fields: IndexMap<Name, FieldDefault>,
    options: CheckerOptions,
}

impl DefaultCascade {
    pub fn new(shape: impl Into<Arc<ShapeDescriptor>>) -> Self {
        Self::with_options(shape, CheckerOptions::default())
    }

    /// Cascade whose defaults are validated under `options`. Use the options
    /// the cascade will be resolved with, so e.g. a `null` default is
    /// accepted when `strictNullChecks` is off.
    pub fn with_options(shape: impl Into<Arc<ShapeDescriptor>>, options: CheckerOptions) -> Self {
        DefaultCascade {
            shape: shape.into(),
            object_default: None,
            fields: IndexMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    pub fn object_default(&self) -> Option<&Value> {
        self.object_default.as_ref()
    }

    pub fn field_default(&self, name: &str) -> Option<&FieldDefault> {
        self.fields.get(name)
    }

    /// Value used when the whole object is absent. Must be an object; fields
    /// it provides are checked against the shape.
    pub fn with_object_default(mut self, default: Value) -> Result<Self, SchemaError> {
        let Some(map) = default.as_object() else {
            return Err(InvalidSchemaKind::NonObjectDefault.into());
        };
        for (name, value) in map {
            let Some(field) = self.shape.field(name) else {
                continue;
            };
            self.check_default(field, value)?;
        }
        self.object_default = Some(default);
        Ok(self)
    }

    /// Value used when field `name` is absent.
    pub fn with_field_default(mut self, name: &str, default: Value) -> Result<Self, SchemaError> {
        let field = self.shape.expect_field(name)?;
        if self.fields.contains_key(name) {
            return Err(InvalidSchemaKind::DuplicateField(field.name.clone()).into());
        }
        self.check_default(field, &default)?;
        let key = field.name.clone();
        self.fields.insert(key, FieldDefault::Value(default));
        Ok(self)
    }

    /// Nested cascade for an object-typed field. The nested cascade's shape
    /// must be structurally equivalent to one of the field's object shapes.
    pub fn with_nested(mut self, name: &str, nested: DefaultCascade) -> Result<Self, SchemaError> {
        let field = self.shape.expect_field(name)?;
        if self.fields.contains_key(name) {
            return Err(InvalidSchemaKind::DuplicateField(field.name.clone()).into());
        }
        let candidates = field.value_kind.object_shapes();
        if candidates.is_empty() {
            return Err(InvalidSchemaKind::NestedCascadeOnNonObject(field.name.clone()).into());
        }
        let nested_tag = TypeTag::Shape(Arc::clone(&nested.shape));
        let mirrors_field = candidates.into_iter().any(|shape| {
            if Arc::ptr_eq(shape, &nested.shape) || **shape == *nested.shape {
                return true;
            }
            let field_tag = TypeTag::Shape(Arc::clone(shape));
            is_assignable(&nested_tag, &field_tag, &self.options)
                && is_assignable(&field_tag, &nested_tag, &self.options)
        });
        if !mirrors_field {
            let name = field.name.clone();
            return Err(InvalidSchemaKind::NestedCascadeShapeMismatch(name).into());
        }
        let key = field.name.clone();
        self.fields.insert(key, FieldDefault::Cascade(nested));
        Ok(self)
    }

    /// `undefined` is an acceptable default for an optional field unless
    /// `exactOptionalPropertyTypes` is on.
    fn check_default(&self, field: &FieldDescriptor, value: &Value) -> Result<(), SchemaError> {
        if value.is_undefined()
            && field.is_optional()
            && !self.options.exact_optional_property_types
        {
            return Ok(());
        }
        conforms(value, &field.value_kind, &self.options)
            .map_err(|_| InvalidSchemaKind::DefaultTypeMismatch(field.name.clone()).into())
    }
}

/// Resolve `supplied` against `cascade`.
///
/// For every field of the cascade's shape:
/// - supplied with a nested cascade: resolved recursively;
/// - supplied otherwise: kept;
/// - absent with a default: the default is used (nested cascades resolve
///   from nothing, so their own defaults apply);
/// - absent, required and without default: `MissingRequiredField`.
///
/// A field holding `undefined` counts as absent. Fields the shape does not
/// name are carried through unchanged.
pub fn resolve_defaults(
    supplied: Option<&Value>,
    cascade: &DefaultCascade,
    options: &CheckerOptions,
) -> Result<Value, DefaultsError> {
    let _span = span!(Level::DEBUG, "resolve_defaults", supplied = supplied.is_some()).entered();
    Resolver { options }.resolve(supplied, cascade, "", 0)
}

struct Resolver<'a> {
    options: &'a CheckerOptions,
}

impl Resolver<'_> {
    fn resolve(
        &self,
        supplied: Option<&Value>,
        cascade: &DefaultCascade,
        path: &str,
        depth: u32,
    ) -> Result<Value, DefaultsError> {
        let limit = self.options.max_depth.min(MAX_CASCADE_DEPTH);
        if depth > limit {
            return Err(DefaultsError::DepthExceeded(limit));
        }

        let mut out: ObjectMap = match supplied.filter(|value| !value.is_undefined()) {
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                let at = if path.is_empty() { "<root>" } else { path };
                return Err(DefaultsError::NotAnObject(at.to_string()));
            }
            None => match &cascade.object_default {
                Some(Value::Object(map)) => {
                    trace!(path, "using object-level default");
                    map.clone()
                }
                _ => ObjectMap::new(),
            },
        };

        for field in cascade.shape.fields() {
            let field_path = if path.is_empty() {
                field.name.to_string()
            } else {
                format!("{}.{}", path, field.name)
            };
            let present = out.get(&field.name).filter(|value| !value.is_undefined());

            let resolved = match (present, cascade.fields.get(&field.name)) {
                (Some(value), Some(FieldDefault::Cascade(nested))) => {
                    Some(self.resolve(Some(value), nested, &field_path, depth + 1)?)
                }
                (Some(_), _) => None,
                (None, Some(FieldDefault::Value(default))) => {
                    trace!(field = %field_path, "using field default");
                    Some(default.clone())
                }
                (None, Some(FieldDefault::Cascade(nested)))
                    if nested.object_default.is_some() || !field.is_optional() =>
                {
                    Some(self.resolve(None, nested, &field_path, depth + 1)?)
                }
                (None, _) if field.is_optional() => None,
                (None, _) => return Err(DefaultsError::MissingRequiredField(field_path)),
            };

            if let Some(value) = resolved {
                out.insert(field.name.clone(), value);
            }
        }

        Ok(Value::Object(out))
    }
}

#[cfg(test)]
#[path = "../tests/defaults_tests.rs"]
mod tests;
