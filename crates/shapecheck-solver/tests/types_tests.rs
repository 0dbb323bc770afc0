use super::*;
use crate::schema::FieldDescriptor;

// =============================================================================
// Union construction
// =============================================================================

#[test]
fn test_union_flattens_nested_unions() {
    let inner = TypeTag::union([TypeTag::STRING, TypeTag::NUMBER]).unwrap();
    let outer = TypeTag::union([inner, TypeTag::BOOLEAN]).unwrap();
    let union = outer.as_union().unwrap();
    assert_eq!(
        union.members(),
        &[TypeTag::STRING, TypeTag::NUMBER, TypeTag::BOOLEAN]
    );
}

#[test]
fn test_union_removes_duplicates() {
    let union = TypeTag::union([TypeTag::STRING, TypeTag::NULL, TypeTag::STRING]).unwrap();
    assert_eq!(union.as_union().unwrap().members().len(), 2);
}

#[test]
fn test_degenerate_union_rejected() {
    let err = TypeTag::union([TypeTag::STRING, TypeTag::STRING]).unwrap_err();
    assert_eq!(
        err,
        SchemaError::InvalidSchema(InvalidSchemaKind::DegenerateUnion { members: 1 })
    );

    let err = TypeTag::union([]).unwrap_err();
    assert_eq!(
        err,
        SchemaError::InvalidSchema(InvalidSchemaKind::DegenerateUnion { members: 0 })
    );
}

#[test]
fn test_union_or_single_collapses() {
    assert_eq!(
        TypeTag::union_or_single([TypeTag::UNDEFINED, TypeTag::UNDEFINED]),
        TypeTag::UNDEFINED
    );
    assert_eq!(TypeTag::union_or_single([]), TypeTag::NEVER);
}

#[test]
fn test_union_contains() {
    let tag = TypeTag::union([TypeTag::VOID, TypeTag::application("Promise", [TypeTag::STRING])])
        .unwrap();
    let union = tag.as_union().unwrap();
    assert!(union.contains(&TypeTag::VOID));
    assert!(union.contains(&TypeTag::application("Promise", [TypeTag::STRING])));
    assert!(!union.contains(&TypeTag::application("Promise", [TypeTag::NUMBER])));
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn test_accepts_undefined() {
    assert!(TypeTag::UNDEFINED.accepts_undefined());
    assert!(TypeTag::VOID.accepts_undefined());
    assert!(
        TypeTag::union([TypeTag::STRING, TypeTag::UNDEFINED])
            .unwrap()
            .accepts_undefined()
    );
    assert!(!TypeTag::STRING.accepts_undefined());
    assert!(!TypeTag::NULL.accepts_undefined());
}

#[test]
fn test_object_shapes_of_union() {
    let fish = ShapeDescriptor::build([FieldDescriptor::new("swim", TypeTag::BOOLEAN)]).unwrap();
    let bird = ShapeDescriptor::build([FieldDescriptor::new("fly", TypeTag::BOOLEAN)]).unwrap();
    let tag = TypeTag::union([
        TypeTag::shape(fish.clone()),
        TypeTag::shape(bird.clone()),
        TypeTag::NULL,
    ])
    .unwrap();
    let shapes = tag.object_shapes();
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].as_ref(), &fish);
    assert_eq!(shapes[1].as_ref(), &bird);
    assert!(TypeTag::STRING.object_shapes().is_empty());
}

#[test]
fn test_element_access_type() {
    let arr = TypeTag::array(TypeTag::STRING);

    let loose = CheckerOptions::default();
    assert_eq!(arr.element_access_type(&loose), Some(TypeTag::STRING));

    let checked = CheckerOptions {
        no_unchecked_indexed_access: true,
        ..CheckerOptions::default()
    };
    let access = arr.element_access_type(&checked).unwrap();
    assert_eq!(access.to_string(), "string | undefined");

    assert_eq!(TypeTag::STRING.element_access_type(&checked), None);
}

#[test]
fn test_element_access_does_not_duplicate_undefined() {
    let element = TypeTag::union([TypeTag::STRING, TypeTag::UNDEFINED]).unwrap();
    let arr = TypeTag::array(element.clone());
    let checked = CheckerOptions {
        no_unchecked_indexed_access: true,
        ..CheckerOptions::default()
    };
    assert_eq!(arr.element_access_type(&checked), Some(element));
}

#[test]
fn test_literal_widening() {
    assert_eq!(
        LiteralValue::String(Arc::from("fish")).widened(),
        IntrinsicKind::String
    );
    assert_eq!(LiteralValue::Number(1.0).widened(), IntrinsicKind::Number);
    assert_eq!(LiteralValue::Boolean(true).widened(), IntrinsicKind::Boolean);
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn test_display() {
    assert_eq!(TypeTag::string_literal("circle").to_string(), "\"circle\"");
    assert_eq!(
        TypeTag::application("Promise", [TypeTag::STRING]).to_string(),
        "Promise<string>"
    );
    assert_eq!(TypeTag::named("Date").to_string(), "Date");
    assert_eq!(TypeTag::array(TypeTag::NUMBER).to_string(), "number[]");
    assert_eq!(
        TypeTag::array(TypeTag::union([TypeTag::STRING, TypeTag::NUMBER]).unwrap()).to_string(),
        "(string | number)[]"
    );
}
