//! Schema model: fields, shapes, parameters, signatures and overload sets.
//!
//! Every descriptor is validated when it is built and is immutable afterwards.
//! Transforms in [`crate::mapped`] never mutate a shape; they build a new one,
//! so several derived views can share one canonical ancestor.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use indexmap::IndexMap;
use smallvec::SmallVec;

use shapecheck_common::limits::SIGNATURE_INLINE_PARAMS;

use crate::errors::{InvalidSchemaKind, SchemaError};
use crate::types::{IntrinsicKind, Name, TypeTag};

bitflags! {
    /// Field modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldModifiers: u8 {
        const OPTIONAL = 1 << 0;
        const READONLY = 1 << 1;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub name: Name,
    pub modifiers: FieldModifiers,
    pub value_kind: TypeTag,
}

impl FieldDescriptor {
    /// A required, mutable field.
    pub fn new(name: &str, value_kind: TypeTag) -> Self {
        FieldDescriptor {
            name: Arc::from(name),
            modifiers: FieldModifiers::empty(),
            value_kind,
        }
    }

    pub fn optional(mut self) -> Self {
        self.modifiers.insert(FieldModifiers::OPTIONAL);
        self
    }

    pub fn readonly(mut self) -> Self {
        self.modifiers.insert(FieldModifiers::READONLY);
        self
    }

    pub fn is_optional(&self) -> bool {
        self.modifiers.contains(FieldModifiers::OPTIONAL)
    }

    pub fn is_readonly(&self) -> bool {
        self.modifiers.contains(FieldModifiers::READONLY)
    }
}

/// One object shape. Field order is kept for display and iteration but is not
/// significant for equality.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ShapeDescriptor {
    fields: IndexMap<Name, FieldDescriptor>,
}

impl ShapeDescriptor {
    /// Build a shape, rejecting duplicate field names.
    pub fn build(fields: impl IntoIterator<Item = FieldDescriptor>) -> Result<Self, SchemaError> {
        let mut map = IndexMap::new();
        for field in fields {
            if map.contains_key(&field.name) {
                return Err(InvalidSchemaKind::DuplicateField(field.name).into());
            }
            map.insert(field.name.clone(), field);
        }
        Ok(ShapeDescriptor { fields: map })
    }

    pub fn empty() -> Self {
        ShapeDescriptor::default()
    }

    /// Transforms build their output field map directly; names are already
    /// unique because they come from an existing shape.
    pub(crate) fn from_field_map(fields: IndexMap<Name, FieldDescriptor>) -> Self {
        ShapeDescriptor { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values().filter(|field| !field.is_optional())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field, failing with `UnknownField` when it is absent.
    pub fn expect_field(&self, name: &str) -> Result<&FieldDescriptor, SchemaError> {
        self.fields
            .get(name)
            .ok_or_else(|| SchemaError::UnknownField(Arc::from(name)))
    }

    /// Whether `obj.name = ...` is allowed.
    pub fn check_write(&self, name: &str) -> Result<(), SchemaError> {
        let field = self.expect_field(name)?;
        if field.is_readonly() {
            return Err(SchemaError::ReadonlyViolation(field.name.clone()));
        }
        Ok(())
    }

    /// Whether `delete obj.name` is allowed: only optional fields may be removed.
    pub fn check_delete(&self, name: &str) -> Result<(), SchemaError> {
        let field = self.expect_field(name)?;
        if !field.is_optional() {
            return Err(SchemaError::DeleteOfRequiredField(field.name.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, field) in self.fields.values().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            if field.is_readonly() {
                f.write_str("readonly ")?;
            }
            f.write_str(&field.name)?;
            if field.is_optional() {
                f.write_str("?")?;
            }
            write!(f, ": {}", field.value_kind)?;
        }
        f.write_str(" }")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDescriptor {
    pub position: usize,
    pub value_kind: TypeTag,
    pub optional: bool,
}

impl ParameterDescriptor {
    pub fn required(position: usize, value_kind: TypeTag) -> Self {
        ParameterDescriptor {
            position,
            value_kind,
            optional: false,
        }
    }

    pub fn optional(position: usize, value_kind: TypeTag) -> Self {
        ParameterDescriptor {
            position,
            value_kind,
            optional: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReturnDescriptor {
    pub value_kind: TypeTag,
}

impl ReturnDescriptor {
    pub fn new(value_kind: TypeTag) -> Self {
        ReturnDescriptor { value_kind }
    }

    /// `void | T`, the return type of an implementation that serves both a
    /// callback overload and a value-returning overload.
    pub fn void_or(value_kind: TypeTag) -> Result<Self, SchemaError> {
        Ok(ReturnDescriptor {
            value_kind: TypeTag::union([TypeTag::VOID, value_kind])?,
        })
    }

    pub fn is_void_or_value(&self) -> bool {
        self.value_kind.as_union().is_some_and(|union| {
            union
                .members()
                .iter()
                .any(|member| member.as_intrinsic() == Some(IntrinsicKind::Void))
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignatureDescriptor {
    params: SmallVec<[ParameterDescriptor; SIGNATURE_INLINE_PARAMS]>,
    return_type: ReturnDescriptor,
}

impl SignatureDescriptor {
    /// Build a signature.
    ///
    /// Parameters must be listed in position order starting at zero, and no
    /// required parameter may follow an optional one.
    pub fn build(
        params: impl IntoIterator<Item = ParameterDescriptor>,
        return_type: ReturnDescriptor,
    ) -> Result<Self, SchemaError> {
        let params: SmallVec<[ParameterDescriptor; SIGNATURE_INLINE_PARAMS]> =
            params.into_iter().collect();
        let mut seen_optional = false;
        for (expected, param) in params.iter().enumerate() {
            if param.position != expected {
                return Err(InvalidSchemaKind::MisplacedParameter {
                    expected,
                    found: param.position,
                }
                .into());
            }
            if param.optional {
                seen_optional = true;
            } else if seen_optional {
                return Err(InvalidSchemaKind::RequiredAfterOptional {
                    position: param.position,
                }
                .into());
            }
        }
        Ok(SignatureDescriptor {
            params,
            return_type,
        })
    }

    /// Shorthand for `(r0, r1, ..., o0?, o1?, ...) => ret`.
    pub fn positional(
        required: impl IntoIterator<Item = TypeTag>,
        optional: impl IntoIterator<Item = TypeTag>,
        return_type: TypeTag,
    ) -> Result<Self, SchemaError> {
        let mut params: Vec<ParameterDescriptor> = required
            .into_iter()
            .enumerate()
            .map(|(i, tag)| ParameterDescriptor::required(i, tag))
            .collect();
        let start = params.len();
        params.extend(
            optional
                .into_iter()
                .enumerate()
                .map(|(i, tag)| ParameterDescriptor::optional(start + i, tag)),
        );
        SignatureDescriptor::build(params, ReturnDescriptor::new(return_type))
    }

    pub fn params(&self) -> &[ParameterDescriptor] {
        &self.params
    }

    pub fn return_type(&self) -> &ReturnDescriptor {
        &self.return_type
    }

    /// Number of arguments a caller must pass.
    pub fn required_param_count(&self) -> usize {
        self.params.iter().take_while(|param| !param.optional).count()
    }
}

impl fmt::Display for SignatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "p{}", param.position)?;
            if param.optional {
                f.write_str("?")?;
            }
            write!(f, ": {}", param.value_kind)?;
        }
        write!(f, ") => {}", self.return_type.value_kind)
    }
}

/// Public overload signatures plus the implementation signature that must be
/// compatible with each of them.
#[derive(Clone, Debug, PartialEq)]
pub struct OverloadSet {
    overloads: Vec<Arc<SignatureDescriptor>>,
    implementation: Arc<SignatureDescriptor>,
}

impl OverloadSet {
    pub fn build(
        overloads: impl IntoIterator<Item = SignatureDescriptor>,
        implementation: SignatureDescriptor,
    ) -> Result<Self, SchemaError> {
        let overloads: Vec<Arc<SignatureDescriptor>> =
            overloads.into_iter().map(Arc::new).collect();
        if overloads.is_empty() {
            return Err(InvalidSchemaKind::EmptyOverloadSet.into());
        }
        Ok(OverloadSet {
            overloads,
            implementation: Arc::new(implementation),
        })
    }

    pub fn overloads(&self) -> &[Arc<SignatureDescriptor>] {
        &self.overloads
    }

    pub fn implementation(&self) -> &SignatureDescriptor {
        &self.implementation
    }
}

#[cfg(test)]
#[path = "../tests/schema_tests.rs"]
mod tests;
