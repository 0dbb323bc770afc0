//! Error kinds surfaced by the engine.
//!
//! Construction errors (`SchemaError`) are raised eagerly when a descriptor,
//! cascade or engine is built; query errors come back from the query that
//! hit them. Nothing here is retried: every error is a schema or predicate
//! defect for the caller to fix.

use std::sync::Arc;

use crate::conformance::ConformanceViolation;
use crate::diagnostics::CompatFailureReason;
use crate::narrowing::VariantTag;
use crate::types::Name;

/// Why a construction input is malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidSchemaKind {
    #[error("duplicate field `{0}`")]
    DuplicateField(Name),
    #[error("required parameter at position {position} follows an optional parameter")]
    RequiredAfterOptional { position: usize },
    #[error("parameter declared at position {found} but listed at position {expected}")]
    MisplacedParameter { expected: usize, found: usize },
    #[error("a union needs at least two distinct members, got {members}")]
    DegenerateUnion { members: usize },
    #[error("an overload set needs at least one declared signature")]
    EmptyOverloadSet,
    #[error("field `{0}` has incompatible types in the intersected shapes")]
    ConflictingField(Name),
    #[error("object-level default must be an object")]
    NonObjectDefault,
    #[error("default for field `{0}` does not conform to the field's type")]
    DefaultTypeMismatch(Name),
    #[error("field `{0}` is not an object type and cannot carry a nested cascade")]
    NestedCascadeOnNonObject(Name),
    #[error("nested cascade for field `{0}` describes a different shape than the field's type")]
    NestedCascadeShapeMismatch(Name),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] InvalidSchemaKind),
    #[error("unknown field `{0}`")]
    UnknownField(Name),
    #[error("cannot assign to `{0}` because it is a read-only property")]
    ReadonlyViolation(Name),
    #[error("the operand of a 'delete' operator must be optional: `{0}`")]
    DeleteOfRequiredField(Name),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompatError {
    /// The implementation signature does not satisfy declared overload `index`.
    #[error("this overload signature (#{index}) is not compatible with its implementation signature: {reason}")]
    IncompatibleImplementation {
        index: usize,
        reason: CompatFailureReason,
    },
}

/// Failure raised by a fallible predicate while it was evaluating a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct PredicateError {
    message: Arc<str>,
}

impl PredicateError {
    pub fn new(message: impl AsRef<str>) -> Self {
        PredicateError {
            message: Arc::from(message.as_ref()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NarrowError {
    #[error("no registered variant matched the value")]
    NoMatch,
    #[error("predicate for variant `{tag}` failed: {cause}")]
    PredicateFailure {
        tag: VariantTag,
        cause: PredicateError,
    },
    #[error("variant `{0}` is registered more than once")]
    DuplicateVariant(VariantTag),
    /// The predicate for `tag` accepted a value that does not have its shape.
    #[error("predicate for variant `{tag}` accepted a value outside its shape: {violation}")]
    ShapeAssertion {
        tag: VariantTag,
        violation: ConformanceViolation,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefaultsError {
    /// Dotted path of a required field that neither the supplied value nor
    /// any default provided.
    #[error("missing required field `{0}`")]
    MissingRequiredField(String),
    #[error("expected an object at `{0}`")]
    NotAnObject(String),
    #[error("default cascade nested deeper than {0} levels")]
    DepthExceeded(u32),
}

/// Umbrella error so callers can `?` across components.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Compat(#[from] CompatError),
    #[error(transparent)]
    Narrow(#[from] NarrowError),
    #[error(transparent)]
    Defaults(#[from] DefaultsError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
