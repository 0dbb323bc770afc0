//! Tests for default cascades.
//!
//! ```typescript
//! function f1({ a, b = 0 } = { a: "foo" }) { ... }
//! f1();     // { a: "foo", b: 0 }
//! f1({});   // error: a is required once an object is supplied
//! ```

use super::*;
use crate::mapped::strip_optional;
use crate::schema::FieldDescriptor;
use crate::types::TypeTag;

fn ab_shape() -> ShapeDescriptor {
    // Both fields become required through `-?`.
    strip_optional(
        &ShapeDescriptor::build([
            FieldDescriptor::new("a", TypeTag::STRING).optional(),
            FieldDescriptor::new("b", TypeTag::NUMBER).optional(),
        ])
        .unwrap(),
    )
}

fn f1_cascade() -> DefaultCascade {
    DefaultCascade::new(ab_shape())
        .with_object_default(Value::object([("a", Value::from("foo"))]))
        .unwrap()
        .with_field_default("b", Value::from(0))
        .unwrap()
}

// =============================================================================
// Object-level and field-level defaults
// =============================================================================

#[test]
fn test_absent_argument_uses_object_default() {
    let options = CheckerOptions::default();
    let resolved = resolve_defaults(None, &f1_cascade(), &options).unwrap();
    assert_eq!(
        resolved,
        Value::object([("a", Value::from("foo")), ("b", Value::from(0))])
    );
}

#[test]
fn test_undefined_argument_counts_as_absent() {
    let options = CheckerOptions::default();
    let resolved = resolve_defaults(Some(&Value::Undefined), &f1_cascade(), &options).unwrap();
    assert_eq!(resolved.get("a"), Some(&Value::from("foo")));
}

#[test]
fn test_empty_object_does_not_fall_back_to_object_default() {
    let options = CheckerOptions::default();
    let err = resolve_defaults(Some(&Value::empty_object()), &f1_cascade(), &options).unwrap_err();
    assert_eq!(err, DefaultsError::MissingRequiredField("a".to_string()));
    assert!(resolve_defaults(None, &f1_cascade(), &options).is_ok());
}

#[test]
fn test_supplied_fields_win_over_defaults() {
    let options = CheckerOptions::default();
    let supplied = Value::object([("a", Value::from("bar")), ("b", Value::from(7))]);
    let resolved = resolve_defaults(Some(&supplied), &f1_cascade(), &options).unwrap();
    assert_eq!(resolved, supplied);
}

#[test]
fn test_field_default_fills_gap() {
    let options = CheckerOptions::default();
    let supplied = Value::object([("a", Value::from("bar"))]);
    let resolved = resolve_defaults(Some(&supplied), &f1_cascade(), &options).unwrap();
    assert_eq!(
        resolved,
        Value::object([("a", Value::from("bar")), ("b", Value::from(0))])
    );
}

#[test]
fn test_explicit_undefined_field_takes_default() {
    let options = CheckerOptions::default();
    let supplied = Value::object([("a", Value::from("bar")), ("b", Value::Undefined)]);
    let resolved = resolve_defaults(Some(&supplied), &f1_cascade(), &options).unwrap();
    assert_eq!(resolved.get("b"), Some(&Value::from(0)));
}

#[test]
fn test_optional_field_without_default_is_omitted() {
    let options = CheckerOptions::default();
    let shape = ShapeDescriptor::build([
        FieldDescriptor::new("a", TypeTag::STRING),
        FieldDescriptor::new("b", TypeTag::NUMBER).optional(),
    ])
    .unwrap();
    let cascade = DefaultCascade::new(shape);
    let supplied = Value::object([("a", Value::from("x"))]);
    let resolved = resolve_defaults(Some(&supplied), &cascade, &options).unwrap();
    assert_eq!(resolved, supplied);
    assert!(resolved.get("b").is_none());
}

#[test]
fn test_extra_fields_are_kept() {
    let options = CheckerOptions::default();
    let supplied = Value::object([("a", Value::from("x")), ("extra", Value::Bool(true))]);
    let resolved = resolve_defaults(Some(&supplied), &f1_cascade(), &options).unwrap();
    assert_eq!(resolved.get("extra"), Some(&Value::Bool(true)));
}

#[test]
fn test_non_object_supplied() {
    let options = CheckerOptions::default();
    let err = resolve_defaults(Some(&Value::from(3)), &f1_cascade(), &options).unwrap_err();
    assert_eq!(err, DefaultsError::NotAnObject("<root>".to_string()));
}

// =============================================================================
// Nested cascades
//
// function connect({ host, tls: { port = 443, verify = true } = {} }) { ... }
// =============================================================================

fn tls_shape() -> ShapeDescriptor {
    ShapeDescriptor::build([
        FieldDescriptor::new("port", TypeTag::NUMBER),
        FieldDescriptor::new("verify", TypeTag::BOOLEAN),
    ])
    .unwrap()
}

fn connect_cascade() -> DefaultCascade {
    let shape = ShapeDescriptor::build([
        FieldDescriptor::new("host", TypeTag::STRING),
        FieldDescriptor::new("tls", TypeTag::shape(tls_shape())),
    ])
    .unwrap();
    let tls = DefaultCascade::new(tls_shape())
        .with_object_default(Value::empty_object())
        .unwrap()
        .with_field_default("port", Value::from(443))
        .unwrap()
        .with_field_default("verify", Value::from(true))
        .unwrap();
    DefaultCascade::new(shape).with_nested("tls", tls).unwrap()
}

#[test]
fn test_nested_cascade_fills_absent_object() {
    let options = CheckerOptions::default();
    let supplied = Value::object([("host", Value::from("example.com"))]);
    let resolved = resolve_defaults(Some(&supplied), &connect_cascade(), &options).unwrap();
    assert_eq!(
        resolved.get("tls"),
        Some(&Value::object([
            ("port", Value::from(443)),
            ("verify", Value::from(true)),
        ]))
    );
}

#[test]
fn test_nested_cascade_fills_partial_object() {
    let options = CheckerOptions::default();
    let supplied = Value::object([
        ("host", Value::from("example.com")),
        ("tls", Value::object([("port", Value::from(8443))])),
    ]);
    let resolved = resolve_defaults(Some(&supplied), &connect_cascade(), &options).unwrap();
    let tls = resolved.get("tls").unwrap();
    assert_eq!(tls.get("port"), Some(&Value::from(8443)));
    assert_eq!(tls.get("verify"), Some(&Value::from(true)));
}

#[test]
fn test_nested_missing_field_reports_dotted_path() {
    let options = CheckerOptions::default();
    let shape = ShapeDescriptor::build([FieldDescriptor::new("tls", TypeTag::shape(tls_shape()))])
        .unwrap();
    let tls = DefaultCascade::new(tls_shape())
        .with_field_default("verify", Value::from(true))
        .unwrap();
    let cascade = DefaultCascade::new(shape).with_nested("tls", tls).unwrap();
    let supplied = Value::object([("tls", Value::empty_object())]);
    let err = resolve_defaults(Some(&supplied), &cascade, &options).unwrap_err();
    assert_eq!(err, DefaultsError::MissingRequiredField("tls.port".to_string()));
}

#[test]
fn test_nested_non_object_reports_path() {
    let options = CheckerOptions::default();
    let supplied = Value::object([("host", Value::from("h")), ("tls", Value::from("yes"))]);
    let err = resolve_defaults(Some(&supplied), &connect_cascade(), &options).unwrap_err();
    assert_eq!(err, DefaultsError::NotAnObject("tls".to_string()));
}

#[test]
fn test_depth_limit() {
    let options = CheckerOptions {
        max_depth: 2,
        ..CheckerOptions::default()
    };
    let mut shape = ShapeDescriptor::empty();
    let mut cascade = DefaultCascade::new(shape.clone());
    for _ in 0..4 {
        shape = ShapeDescriptor::build([FieldDescriptor::new(
            "inner",
            TypeTag::shape(shape.clone()),
        )])
        .unwrap();
        cascade = DefaultCascade::new(shape.clone())
            .with_nested("inner", cascade)
            .unwrap();
    }
    let err = resolve_defaults(None, &cascade, &options).unwrap_err();
    assert_eq!(err, DefaultsError::DepthExceeded(2));
    assert!(resolve_defaults(None, &cascade, &CheckerOptions::default()).is_ok());
}

// =============================================================================
// Cascade construction
// =============================================================================

#[test]
fn test_cascade_construction_errors() {
    assert_eq!(
        DefaultCascade::new(ab_shape())
            .with_object_default(Value::from(1))
            .unwrap_err(),
        SchemaError::InvalidSchema(InvalidSchemaKind::NonObjectDefault)
    );
    assert_eq!(
        DefaultCascade::new(ab_shape())
            .with_field_default("zzz", Value::from(1))
            .unwrap_err(),
        SchemaError::UnknownField(Arc::from("zzz"))
    );
    assert_eq!(
        DefaultCascade::new(ab_shape())
            .with_field_default("b", Value::from("zero"))
            .unwrap_err(),
        SchemaError::InvalidSchema(InvalidSchemaKind::DefaultTypeMismatch(Arc::from("b")))
    );
    assert_eq!(
        DefaultCascade::new(ab_shape())
            .with_object_default(Value::object([("a", Value::from(1))]))
            .unwrap_err(),
        SchemaError::InvalidSchema(InvalidSchemaKind::DefaultTypeMismatch(Arc::from("a")))
    );
    assert_eq!(
        f1_cascade()
            .with_field_default("b", Value::from(1))
            .unwrap_err(),
        SchemaError::InvalidSchema(InvalidSchemaKind::DuplicateField(Arc::from("b")))
    );
    assert_eq!(
        DefaultCascade::new(ab_shape())
            .with_nested("a", DefaultCascade::new(ShapeDescriptor::empty()))
            .unwrap_err(),
        SchemaError::InvalidSchema(InvalidSchemaKind::NestedCascadeOnNonObject(Arc::from("a")))
    );
}

#[test]
fn test_nested_cascade_must_mirror_field_shape() {
    let shape = ShapeDescriptor::build([
        FieldDescriptor::new("host", TypeTag::STRING),
        FieldDescriptor::new("tls", TypeTag::shape(tls_shape())),
    ])
    .unwrap();
    let color = ShapeDescriptor::build([FieldDescriptor::new("color", TypeTag::STRING)]).unwrap();
    let unrelated = DefaultCascade::new(color)
        .with_field_default("color", Value::from("red"))
        .unwrap();
    assert_eq!(
        DefaultCascade::new(shape.clone())
            .with_nested("tls", unrelated)
            .unwrap_err(),
        SchemaError::InvalidSchema(InvalidSchemaKind::NestedCascadeShapeMismatch(Arc::from(
            "tls"
        )))
    );

    // A wider shape is not equivalent either: `port` would go unchecked.
    let partial = ShapeDescriptor::build([FieldDescriptor::new("verify", TypeTag::BOOLEAN)])
        .unwrap();
    assert!(
        DefaultCascade::new(shape)
            .with_nested("tls", DefaultCascade::new(partial))
            .is_err()
    );
}

#[test]
fn test_nested_cascade_matches_union_member() {
    let options = CheckerOptions::default();
    let tls_or_null = TypeTag::union([TypeTag::shape(tls_shape()), TypeTag::NULL]).unwrap();
    let shape = ShapeDescriptor::build([FieldDescriptor::new("tls", tls_or_null)]).unwrap();
    let tls = DefaultCascade::new(tls_shape())
        .with_field_default("verify", Value::from(true))
        .unwrap();
    let cascade = DefaultCascade::new(shape).with_nested("tls", tls).unwrap();

    let supplied = Value::object([("tls", Value::empty_object())]);
    let err = resolve_defaults(Some(&supplied), &cascade, &options).unwrap_err();
    assert_eq!(err, DefaultsError::MissingRequiredField("tls.port".to_string()));
}

#[test]
fn test_defaults_are_checked_under_cascade_options() {
    let shape = ShapeDescriptor::build([FieldDescriptor::new("a", TypeTag::STRING)]).unwrap();
    assert!(
        DefaultCascade::new(shape.clone())
            .with_field_default("a", Value::Null)
            .is_err()
    );

    let loose = CheckerOptions {
        strict_null_checks: false,
        ..CheckerOptions::default()
    };
    let cascade = DefaultCascade::with_options(shape, loose.clone())
        .with_field_default("a", Value::Null)
        .unwrap();
    assert_eq!(cascade.options(), &loose);
    let resolved = resolve_defaults(None, &cascade, &loose).unwrap();
    assert_eq!(resolved.get("a"), Some(&Value::Null));
}

#[test]
fn test_optional_field_accepts_undefined_default() {
    let shape = ShapeDescriptor::build([
        FieldDescriptor::new("a", TypeTag::STRING),
        FieldDescriptor::new("b", TypeTag::NUMBER).optional(),
    ])
    .unwrap();
    assert!(
        DefaultCascade::new(shape.clone())
            .with_field_default("b", Value::Undefined)
            .is_ok()
    );
    assert!(
        DefaultCascade::new(shape.clone())
            .with_object_default(Value::object([("a", Value::from("x")), ("b", Value::Undefined)]))
            .is_ok()
    );
    assert_eq!(
        DefaultCascade::new(shape.clone())
            .with_field_default("a", Value::Undefined)
            .unwrap_err(),
        SchemaError::InvalidSchema(InvalidSchemaKind::DefaultTypeMismatch(Arc::from("a")))
    );

    let exact = CheckerOptions {
        exact_optional_property_types: true,
        ..CheckerOptions::default()
    };
    assert!(
        DefaultCascade::with_options(shape, exact)
            .with_field_default("b", Value::Undefined)
            .is_err()
    );
}

#[test]
fn test_engine_delegates_to_resolver() {
    let engine = crate::narrowing::NarrowingEngine::builder().build();
    let resolved = engine.resolve_defaults(None, &f1_cascade()).unwrap();
    assert_eq!(resolved.get("b"), Some(&Value::from(0)));
}
