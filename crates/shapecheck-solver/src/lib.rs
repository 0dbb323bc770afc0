//! Structural Shape Engine
//!
//! Runtime counterpart of a structural type checker. Shapes are data and are
//! compared by width subtyping, never by identity:
//!
//! - **Schema model**: fields, shapes, signatures and overload sets, validated
//!   when built and immutable afterwards
//! - **Modifier transforms**: `-?`, `-readonly`, `Pick`, `Omit`, `Partial`,
//!   intersections, all pure
//! - **Signature compatibility**: overload-implementation validation with
//!   structured failure reasons
//! - **Narrowing**: guard-based selection of a variant for a runtime value,
//!   plus default cascades for omitted fields
//!
//! All query types are `Send + Sync`; build once, then share.
pub mod compat;
pub mod conformance;
pub mod defaults;
pub mod diagnostics;
pub mod errors;
pub mod mapped;
pub mod narrowing;
pub mod schema;
pub mod subtype;
pub mod types;
pub mod value;

pub use compat::CompatChecker;
pub use conformance::{ConformanceViolation, ViolationKind, conforms, conforms_to_shape};
pub use defaults::{DefaultCascade, FieldDefault, resolve_defaults};
pub use diagnostics::{CompatFailureReason, CompatTracer, DiagnosticTracer, FastTracer};
pub use errors::{
    CompatError, DefaultsError, Error, InvalidSchemaKind, NarrowError, PredicateError, Result,
    SchemaError,
};
pub use mapped::{
    FieldModifier, MappedModifier, MappedTransform, apply_mapped, apply_modifier, intersect,
    make_optional, make_readonly, omit, pick, strip_optional, strip_readonly,
};
pub use narrowing::{
    FilterByVariant, NarrowingEngine, NarrowingEngineBuilder, ValueGuard, VariantRegistration,
    VariantTag,
};
pub use schema::{
    FieldDescriptor, FieldModifiers, OverloadSet, ParameterDescriptor, ReturnDescriptor,
    ShapeDescriptor, SignatureDescriptor,
};
pub use shapecheck_common::{CheckerOptions, ParameterVariance};
pub use subtype::{SubtypeChecker, is_assignable};
pub use types::{ApplicationTag, IntrinsicKind, LiteralValue, Name, TypeTag, UnionTag};
pub use value::{FunctionValue, ObjectMap, TypeofKind, Value};

// Test modules
// types_tests: loaded from types.rs
// schema_tests: loaded from schema.rs
// subtype_tests: loaded from subtype.rs
// compat_tests: loaded from compat.rs
// mapped_tests: loaded from mapped.rs
// narrowing_tests: loaded from narrowing.rs
// defaults_tests: loaded from defaults.rs
#[cfg(test)]
#[path = "../tests/concurrent_tests.rs"]
mod concurrent_tests;
#[cfg(test)]
#[path = "../tests/integration_tests.rs"]
mod integration_tests;
