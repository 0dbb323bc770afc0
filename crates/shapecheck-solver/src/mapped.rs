//! Mapped-type style transforms over shapes.
//!
//! Handles the modifier half of `{ [K in keyof T]: T[K] }`:
//!
//! ```typescript
//! type Concrete<T> = { [K in keyof T]-?: T[K] };            // strip_optional
//! type CreateMutable<T> = { -readonly [K in keyof T]: T[K] }; // strip_readonly
//! type ObjReqA = Obj & Concrete<Pick<Obj, 'a'>>;             // pick + intersect
//! ```
//!
//! Every transform is pure: the input shape is never touched, and the result
//! is a fresh `ShapeDescriptor`. Value kinds are carried over unchanged.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::{Level, span, trace};

use shapecheck_common::CheckerOptions;

use crate::errors::{InvalidSchemaKind, SchemaError};
use crate::schema::{FieldDescriptor, FieldModifiers, ShapeDescriptor};
use crate::subtype::SubtypeChecker;
use crate::types::Name;

/// Which modifier a transform touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldModifier {
    Optional,
    Readonly,
}

impl FieldModifier {
    fn flag(self) -> FieldModifiers {
        match self {
            FieldModifier::Optional => FieldModifiers::OPTIONAL,
            FieldModifier::Readonly => FieldModifiers::READONLY,
        }
    }
}

/// `+?` / `-?` and `+readonly` / `-readonly`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MappedModifier {
    Add,
    Remove,
}

/// A homomorphic mapped transform: optional/readonly changes applied to a
/// set of keys (all keys when `keys` is `None`). `None` for a modifier
/// preserves the source field's modifier.
#[derive(Clone, Debug, Default)]
pub struct MappedTransform {
    pub keys: Option<Vec<Name>>,
    pub optional_modifier: Option<MappedModifier>,
    pub readonly_modifier: Option<MappedModifier>,
}

fn apply(flags: &mut FieldModifiers, flag: FieldModifiers, modifier: Option<MappedModifier>) {
    match modifier {
        Some(MappedModifier::Add) => flags.insert(flag),
        Some(MappedModifier::Remove) => flags.remove(flag),
        None => {}
    }
}

/// Apply a mapped transform.
///
/// Fails with `UnknownField` if `keys` names a field the shape does not have.
pub fn apply_mapped(
    shape: &ShapeDescriptor,
    transform: &MappedTransform,
) -> Result<ShapeDescriptor, SchemaError> {
    let _span = span!(
        Level::TRACE,
        "apply_mapped",
        fields = shape.len(),
        optional = ?transform.optional_modifier,
        readonly = ?transform.readonly_modifier
    )
    .entered();

    let selected: Option<FxHashSet<&str>> = match &transform.keys {
        Some(keys) => {
            let mut set = FxHashSet::default();
            for key in keys {
                shape.expect_field(key)?;
                set.insert(key.as_ref());
            }
            Some(set)
        }
        None => None,
    };

    let fields: IndexMap<Name, FieldDescriptor> = shape
        .fields()
        .map(|field| {
            let mut field = field.clone();
            let in_scope = selected
                .as_ref()
                .is_none_or(|set| set.contains(field.name.as_ref()));
            if in_scope {
                apply(
                    &mut field.modifiers,
                    FieldModifiers::OPTIONAL,
                    transform.optional_modifier,
                );
                apply(
                    &mut field.modifiers,
                    FieldModifiers::READONLY,
                    transform.readonly_modifier,
                );
            }
            (field.name.clone(), field)
        })
        .collect();

    Ok(ShapeDescriptor::from_field_map(fields))
}

fn apply_to_all(
    shape: &ShapeDescriptor,
    modifier: FieldModifier,
    op: MappedModifier,
) -> ShapeDescriptor {
    let flag = modifier.flag();
    let fields = shape
        .fields()
        .map(|field| {
            let mut field = field.clone();
            apply(&mut field.modifiers, flag, Some(op));
            (field.name.clone(), field)
        })
        .collect();
    ShapeDescriptor::from_field_map(fields)
}

/// `-?` on every field. Idempotent.
pub fn strip_optional(shape: &ShapeDescriptor) -> ShapeDescriptor {
    trace!(fields = shape.len(), "strip_optional");
    apply_to_all(shape, FieldModifier::Optional, MappedModifier::Remove)
}

/// `-readonly` on every field. Idempotent.
pub fn strip_readonly(shape: &ShapeDescriptor) -> ShapeDescriptor {
    trace!(fields = shape.len(), "strip_readonly");
    apply_to_all(shape, FieldModifier::Readonly, MappedModifier::Remove)
}

/// `Partial<T>`.
pub fn make_optional(shape: &ShapeDescriptor) -> ShapeDescriptor {
    apply_to_all(shape, FieldModifier::Optional, MappedModifier::Add)
}

/// `Readonly<T>`.
pub fn make_readonly(shape: &ShapeDescriptor) -> ShapeDescriptor {
    apply_to_all(shape, FieldModifier::Readonly, MappedModifier::Add)
}

/// Add or remove one modifier on the named fields only.
pub fn apply_modifier(
    shape: &ShapeDescriptor,
    field_names: &[&str],
    modifier: FieldModifier,
    op: MappedModifier,
) -> Result<ShapeDescriptor, SchemaError> {
    let keys = Some(field_names.iter().map(|name| Arc::from(*name)).collect());
    let transform = match modifier {
        FieldModifier::Optional => MappedTransform {
            keys,
            optional_modifier: Some(op),
            readonly_modifier: None,
        },
        FieldModifier::Readonly => MappedTransform {
            keys,
            optional_modifier: None,
            readonly_modifier: Some(op),
        },
    };
    apply_mapped(shape, &transform)
}

/// `Pick<T, K>`: keep only the named fields, modifiers intact.
pub fn pick(
    shape: &ShapeDescriptor,
    field_names: &[&str],
) -> Result<ShapeDescriptor, SchemaError> {
    let mut fields = IndexMap::new();
    for name in field_names {
        let field = shape.expect_field(name)?;
        fields.insert(field.name.clone(), field.clone());
    }
    Ok(ShapeDescriptor::from_field_map(fields))
}

/// `Omit<T, K>`, restricted to keys that exist.
pub fn omit(
    shape: &ShapeDescriptor,
    field_names: &[&str],
) -> Result<ShapeDescriptor, SchemaError> {
    let mut dropped: FxHashSet<&str> = FxHashSet::default();
    for name in field_names {
        dropped.insert(shape.expect_field(name)?.name.as_ref());
    }
    let fields = shape
        .fields()
        .filter(|field| !dropped.contains(field.name.as_ref()))
        .map(|field| (field.name.clone(), field.clone()))
        .collect();
    Ok(ShapeDescriptor::from_field_map(fields))
}

/// `A & B` over two shapes.
///
/// A field present in both constituents is optional only if it is optional
/// in both, and readonly if it is readonly in either. Its type is the
/// narrower of the two; types where neither is assignable to the other are
/// rejected as `ConflictingField`.
pub fn intersect(
    left: &ShapeDescriptor,
    right: &ShapeDescriptor,
    options: &CheckerOptions,
) -> Result<ShapeDescriptor, SchemaError> {
    let mut fields: IndexMap<Name, FieldDescriptor> = left
        .fields()
        .map(|field| (field.name.clone(), field.clone()))
        .collect();

    for right_field in right.fields() {
        let Some(existing) = fields.get_mut(&right_field.name) else {
            fields.insert(right_field.name.clone(), right_field.clone());
            continue;
        };

        let mut checker = SubtypeChecker::new(options);
        if checker.is_assignable(&right_field.value_kind, &existing.value_kind) {
            existing.value_kind = right_field.value_kind.clone();
        } else if !checker.is_assignable(&existing.value_kind, &right_field.value_kind) {
            return Err(InvalidSchemaKind::ConflictingField(right_field.name.clone()).into());
        }

        let optional = existing.is_optional() && right_field.is_optional();
        let readonly = existing.is_readonly() || right_field.is_readonly();
        existing.modifiers.set(FieldModifiers::OPTIONAL, optional);
        existing.modifiers.set(FieldModifiers::READONLY, readonly);
    }

    Ok(ShapeDescriptor::from_field_map(fields))
}

#[cfg(test)]
#[path = "../tests/mapped_tests.rs"]
mod tests;
