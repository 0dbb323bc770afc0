//! Structural assignability between type tags.
//!
//! Shapes are compared by width subtyping: the source must carry every
//! non-optional field of the target with a compatible type, and may carry
//! extra fields. Nothing is compared by identity; two independently built but
//! equal shapes are interchangeable.

use tracing::trace;

use shapecheck_common::CheckerOptions;

use crate::schema::ShapeDescriptor;
use crate::types::{ApplicationTag, IntrinsicKind, TypeTag};

/// Assignability checker. Holds only a borrowed configuration and the
/// current recursion depth, so one can be created per query.
pub struct SubtypeChecker<'a> {
    pub(crate) options: &'a CheckerOptions,
    depth: u32,
    depth_exceeded: bool,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(options: &'a CheckerOptions) -> Self {
        SubtypeChecker {
            options,
            depth: 0,
            depth_exceeded: false,
        }
    }

    /// True if the last walk gave up because it nested past `max_depth`.
    pub fn depth_exceeded(&self) -> bool {
        self.depth_exceeded
    }

    /// Is `source` assignable to `target`?
    pub fn is_assignable(&mut self, source: &TypeTag, target: &TypeTag) -> bool {
        if source == target {
            return true;
        }
        if self.depth >= self.options.max_depth {
            trace!(depth = self.depth, "structural depth limit reached");
            self.depth_exceeded = true;
            return false;
        }
        self.depth += 1;
        let result = self.check(source, target);
        self.depth -= 1;
        result
    }

    /// Both directions hold.
    pub fn is_equivalent(&mut self, a: &TypeTag, b: &TypeTag) -> bool {
        self.is_assignable(a, b) && self.is_assignable(b, a)
    }

    fn check(&mut self, source: &TypeTag, target: &TypeTag) -> bool {
        use IntrinsicKind as K;

        match (source, target) {
            (_, TypeTag::Intrinsic(K::Any | K::Unknown)) => true,
            // `any` is the escape hatch in both directions.
            (TypeTag::Intrinsic(K::Any), _) => true,
            (TypeTag::Intrinsic(K::Never), _) => true,
            (TypeTag::Intrinsic(K::Null | K::Undefined), _)
                if !self.options.strict_null_checks =>
            {
                true
            }
            (TypeTag::Intrinsic(K::Undefined), TypeTag::Intrinsic(K::Void)) => true,

            // Source unions must be handled before target unions:
            // `A | B` to `A | B | C` needs every source member to land somewhere.
            (TypeTag::Union(union), _) => union
                .members()
                .iter()
                .all(|member| self.is_assignable(member, target)),
            (_, TypeTag::Union(union)) => union
                .members()
                .iter()
                .any(|member| self.is_assignable(source, member)),

            (TypeTag::Literal(literal), TypeTag::Intrinsic(kind)) => literal.widened() == *kind,
            (TypeTag::Shape(s), TypeTag::Shape(t)) => self.check_shape(s, t),
            (TypeTag::Function(s), TypeTag::Function(t)) => {
                self.check_signature_fast(s, t)
            }
            (TypeTag::Array(s), TypeTag::Array(t)) => self.is_assignable(s, t),
            (TypeTag::Application(s), TypeTag::Application(t)) => self.check_application(s, t),
            _ => false,
        }
    }

    /// Width subtyping: every required target field must exist in the source
    /// as a required field of a compatible type; optional target fields, when
    /// present in the source, must be compatible too.
    pub(crate) fn check_shape(&mut self, source: &ShapeDescriptor, target: &ShapeDescriptor) -> bool {
        for target_field in target.fields() {
            match source.field(&target_field.name) {
                Some(source_field) => {
                    if source_field.is_optional() && !target_field.is_optional() {
                        trace!(field = %target_field.name, "optional field cannot satisfy required field");
                        return false;
                    }
                    if !self.is_assignable(&source_field.value_kind, &target_field.value_kind) {
                        trace!(field = %target_field.name, "field type mismatch");
                        return false;
                    }
                }
                None if target_field.is_optional() => {}
                None => {
                    trace!(field = %target_field.name, "missing required field");
                    return false;
                }
            }
        }
        true
    }

    /// Named applications are nominal by name and invariant in their arguments.
    fn check_application(&mut self, source: &ApplicationTag, target: &ApplicationTag) -> bool {
        source.name == target.name
            && source.args.len() == target.args.len()
            && source
                .args
                .iter()
                .zip(&target.args)
                .all(|(s, t)| self.is_equivalent(s, t))
    }
}

/// One-shot convenience wrapper around [`SubtypeChecker::is_assignable`].
pub fn is_assignable(source: &TypeTag, target: &TypeTag, options: &CheckerOptions) -> bool {
    SubtypeChecker::new(options).is_assignable(source, target)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
