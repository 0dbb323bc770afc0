//! Type tags: the value-kind vocabulary shared by fields, parameters and returns.
//!
//! A `TypeTag` is a small closed sum over primitive kinds, literals, shape
//! references, unions, function types, arrays and opaque named applications
//! (`Promise<string>`, `Date`). Compound variants hold `Arc`s so tags are cheap
//! to clone and can be shared between derived shapes.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use shapecheck_common::CheckerOptions;
use shapecheck_common::limits::UNION_INLINE_MEMBERS;

use crate::errors::{InvalidSchemaKind, SchemaError};
use crate::schema::{ShapeDescriptor, SignatureDescriptor};

/// Interned-by-sharing identifier used for field names and application names.
pub type Name = Arc<str>;

/// Primitive kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Any,
    Unknown,
    Never,
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
}

impl IntrinsicKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IntrinsicKind::Any => "any",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Never => "never",
            IntrinsicKind::String => "string",
            IntrinsicKind::Number => "number",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::Void => "void",
        }
    }
}

/// Literal types used as discriminants (`kind: "circle"`).
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    String(Arc<str>),
    Number(f64),
    Boolean(bool),
}

impl LiteralValue {
    /// The primitive kind this literal widens to.
    pub fn widened(&self) -> IntrinsicKind {
        match self {
            LiteralValue::String(_) => IntrinsicKind::String,
            LiteralValue::Number(_) => IntrinsicKind::Number,
            LiteralValue::Boolean(_) => IntrinsicKind::Boolean,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "\"{}\"", s),
            LiteralValue::Number(n) => write!(f, "{}", n),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Members of a union, flattened and deduplicated. Always at least two.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionTag {
    members: SmallVec<[TypeTag; UNION_INLINE_MEMBERS]>,
}

impl UnionTag {
    pub fn members(&self) -> &[TypeTag] {
        &self.members
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.members.iter().any(|member| member == tag)
    }
}

/// An opaque named type with arguments, compared nominally by name and
/// invariantly by arguments: `Promise<string>`, `Date`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApplicationTag {
    pub name: Name,
    pub args: Vec<TypeTag>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeTag {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    Shape(Arc<ShapeDescriptor>),
    Union(Arc<UnionTag>),
    Function(Arc<SignatureDescriptor>),
    Array(Arc<TypeTag>),
    Application(Arc<ApplicationTag>),
}

impl TypeTag {
    pub const ANY: TypeTag = TypeTag::Intrinsic(IntrinsicKind::Any);
    pub const UNKNOWN: TypeTag = TypeTag::Intrinsic(IntrinsicKind::Unknown);
    pub const NEVER: TypeTag = TypeTag::Intrinsic(IntrinsicKind::Never);
    pub const STRING: TypeTag = TypeTag::Intrinsic(IntrinsicKind::String);
    pub const NUMBER: TypeTag = TypeTag::Intrinsic(IntrinsicKind::Number);
    pub const BOOLEAN: TypeTag = TypeTag::Intrinsic(IntrinsicKind::Boolean);
    pub const NULL: TypeTag = TypeTag::Intrinsic(IntrinsicKind::Null);
    pub const UNDEFINED: TypeTag = TypeTag::Intrinsic(IntrinsicKind::Undefined);
    pub const VOID: TypeTag = TypeTag::Intrinsic(IntrinsicKind::Void);

    pub fn string_literal(value: &str) -> TypeTag {
        TypeTag::Literal(LiteralValue::String(Arc::from(value)))
    }

    pub fn number_literal(value: f64) -> TypeTag {
        TypeTag::Literal(LiteralValue::Number(value))
    }

    pub fn shape(shape: impl Into<Arc<ShapeDescriptor>>) -> TypeTag {
        TypeTag::Shape(shape.into())
    }

    pub fn function(signature: impl Into<Arc<SignatureDescriptor>>) -> TypeTag {
        TypeTag::Function(signature.into())
    }

    pub fn array(element: TypeTag) -> TypeTag {
        TypeTag::Array(Arc::new(element))
    }

    /// A named application such as `Promise<string>`.
    pub fn application(name: &str, args: impl IntoIterator<Item = TypeTag>) -> TypeTag {
        TypeTag::Application(Arc::new(ApplicationTag {
            name: Arc::from(name),
            args: args.into_iter().collect(),
        }))
    }

    /// A named type without arguments, such as `Date`.
    pub fn named(name: &str) -> TypeTag {
        TypeTag::application(name, [])
    }

    /// Build a union from its members.
    ///
    /// Nested unions are flattened and duplicates removed; fewer than two
    /// distinct members is a degenerate union and is rejected.
    pub fn union(members: impl IntoIterator<Item = TypeTag>) -> Result<TypeTag, SchemaError> {
        let flat = flatten_union_members(members);
        if flat.len() < 2 {
            return Err(SchemaError::InvalidSchema(
                InvalidSchemaKind::DegenerateUnion { members: flat.len() },
            ));
        }
        Ok(TypeTag::Union(Arc::new(UnionTag { members: flat })))
    }

    /// Like [`TypeTag::union`], but collapses a single surviving member to
    /// itself instead of failing. Used where the engine widens a tag it was
    /// handed (e.g. adding `undefined`).
    pub(crate) fn union_or_single(members: impl IntoIterator<Item = TypeTag>) -> TypeTag {
        let mut flat = flatten_union_members(members);
        match flat.len() {
            0 => TypeTag::NEVER,
            1 => flat.remove(0),
            _ => TypeTag::Union(Arc::new(UnionTag { members: flat })),
        }
    }

    pub fn as_intrinsic(&self) -> Option<IntrinsicKind> {
        match self {
            TypeTag::Intrinsic(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<&Arc<ShapeDescriptor>> {
        match self {
            TypeTag::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_union(&self) -> Option<&UnionTag> {
        match self {
            TypeTag::Union(union) => Some(union),
            _ => None,
        }
    }

    /// True for `undefined`, `void`, or a union containing either.
    pub fn accepts_undefined(&self) -> bool {
        match self {
            TypeTag::Intrinsic(
                IntrinsicKind::Undefined
                | IntrinsicKind::Void
                | IntrinsicKind::Any
                | IntrinsicKind::Unknown,
            ) => true,
            TypeTag::Union(union) => union.members().iter().any(TypeTag::accepts_undefined),
            _ => false,
        }
    }

    /// Shapes this tag may describe: the shape itself, or every shape member
    /// of a union.
    pub fn object_shapes(&self) -> Vec<&Arc<ShapeDescriptor>> {
        match self {
            TypeTag::Shape(shape) => vec![shape],
            TypeTag::Union(union) => union
                .members()
                .iter()
                .filter_map(TypeTag::as_shape)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Result type of `arr[i]` on an array tag.
    ///
    /// Without `noUncheckedIndexedAccess` the element type is returned as is,
    /// even though the access may run past the end. With it, `undefined` is
    /// added. Returns `None` for non-array tags.
    pub fn element_access_type(&self, options: &CheckerOptions) -> Option<TypeTag> {
        let TypeTag::Array(element) = self else {
            return None;
        };
        if options.no_unchecked_indexed_access {
            Some(TypeTag::union_or_single([
                element.as_ref().clone(),
                TypeTag::UNDEFINED,
            ]))
        } else {
            Some(element.as_ref().clone())
        }
    }
}

fn flatten_union_members(
    members: impl IntoIterator<Item = TypeTag>,
) -> SmallVec<[TypeTag; UNION_INLINE_MEMBERS]> {
    let mut flat: SmallVec<[TypeTag; UNION_INLINE_MEMBERS]> = SmallVec::new();
    for member in members {
        match member {
            TypeTag::Union(inner) => {
                for tag in inner.members() {
                    if !flat.contains(tag) {
                        flat.push(tag.clone());
                    }
                }
            }
            other => {
                if !flat.contains(&other) {
                    flat.push(other);
                }
            }
        }
    }
    flat
}

impl From<IntrinsicKind> for TypeTag {
    fn from(kind: IntrinsicKind) -> Self {
        TypeTag::Intrinsic(kind)
    }
}

impl From<ShapeDescriptor> for TypeTag {
    fn from(shape: ShapeDescriptor) -> Self {
        TypeTag::Shape(Arc::new(shape))
    }
}

impl From<SignatureDescriptor> for TypeTag {
    fn from(signature: SignatureDescriptor) -> Self {
        TypeTag::Function(Arc::new(signature))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Intrinsic(kind) => f.write_str(kind.as_str()),
            TypeTag::Literal(literal) => write!(f, "{}", literal),
            TypeTag::Shape(shape) => write!(f, "{}", shape),
            TypeTag::Union(union) => {
                for (i, member) in union.members().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            TypeTag::Function(signature) => write!(f, "{}", signature),
            TypeTag::Array(element) => match element.as_ref() {
                TypeTag::Union(_) | TypeTag::Function(_) => write!(f, "({})[]", element),
                _ => write!(f, "{}[]", element),
            },
            TypeTag::Application(app) => {
                f.write_str(&app.name)?;
                if !app.args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in app.args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
