//! Runtime narrowing of values to registered variants.
//!
//! A variant is a tag, the shape its values are expected to have, and a guard
//! deciding membership:
//!
//! ```typescript
//! function isFish(pet: Fish | Bird): pet is Fish {
//!   return (pet as Fish).swim !== undefined;
//! }
//! const underWater: Fish[] = zoo.filter(isFish);
//! ```
//!
//! ## Guards are trusted
//!
//! A guard answering `true` is taken at its word: the engine does not prove
//! that the value actually has the variant's shape. `verifyVariantShapes`
//! adds a post-hoc conformance check for debug and test builds.
//!
//! ## Evaluation
//!
//! Each `narrow` call runs a small state machine,
//! `Init -> Evaluating(i) -> { Matched(i) | Exhausted }`, over the frozen
//! registration list. Nothing is cached between calls, so guards may be
//! impure.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{Level, debug, span, trace};

use shapecheck_common::CheckerOptions;

use crate::conformance::conforms_to_shape;
use crate::defaults::{self, DefaultCascade};
use crate::errors::{DefaultsError, NarrowError, PredicateError};
use crate::schema::ShapeDescriptor;
use crate::types::{LiteralValue, Name};
use crate::value::{TypeofKind, Value};

/// Identifier of a registered variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariantTag(Arc<str>);

impl VariantTag {
    pub fn new(name: &str) -> Self {
        VariantTag(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariantTag {
    fn from(name: &str) -> Self {
        VariantTag::new(name)
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type GuardFn = dyn Fn(&Value) -> bool + Send + Sync;
pub type FallibleGuardFn = dyn Fn(&Value) -> Result<bool, PredicateError> + Send + Sync;

/// Membership test for a variant.
///
/// # Examples
/// ```typescript
/// typeof x === "function"          -> ValueGuard::Typeof(TypeofKind::Function)
/// "swim" in pet                    -> ValueGuard::InProperty("swim")
/// (pet as Fish).swim !== undefined -> ValueGuard::Callable("swim")
/// pet.kind === "fish"              -> ValueGuard::Discriminant { property: "kind", value: "fish" }
/// ```
#[derive(Clone)]
pub enum ValueGuard {
    /// `typeof x === "..."`
    Typeof(TypeofKind),

    /// `prop in x`
    ///
    /// Throws, like the operator, when `x` is a primitive.
    InProperty(Name),

    /// `typeof x.prop === "function"`
    Callable(Name),

    /// `x.prop === literal`
    Discriminant { property: Name, value: LiteralValue },

    /// The value conforms to the shape.
    Conforms(Arc<ShapeDescriptor>),

    /// `x` in a conditional.
    Truthy,

    All(Vec<ValueGuard>),
    Any(Vec<ValueGuard>),
    Not(Box<ValueGuard>),

    /// A caller-supplied `x is T` predicate.
    Custom(Arc<GuardFn>),

    /// A caller-supplied predicate that may fail while evaluating.
    Fallible(Arc<FallibleGuardFn>),
}

impl ValueGuard {
    pub fn in_property(name: &str) -> Self {
        ValueGuard::InProperty(Arc::from(name))
    }

    pub fn callable(name: &str) -> Self {
        ValueGuard::Callable(Arc::from(name))
    }

    pub fn discriminant(property: &str, value: LiteralValue) -> Self {
        ValueGuard::Discriminant {
            property: Arc::from(property),
            value,
        }
    }

    pub fn conforms(shape: impl Into<Arc<ShapeDescriptor>>) -> Self {
        ValueGuard::Conforms(shape.into())
    }

    pub fn custom(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        ValueGuard::Custom(Arc::new(predicate))
    }

    pub fn fallible(
        predicate: impl Fn(&Value) -> Result<bool, PredicateError> + Send + Sync + 'static,
    ) -> Self {
        ValueGuard::Fallible(Arc::new(predicate))
    }

    pub fn negate(self) -> Self {
        ValueGuard::Not(Box::new(self))
    }

    /// Evaluate the guard. `All` and `Any` short-circuit left to right, and
    /// the first error stops evaluation.
    pub fn evaluate(&self, value: &Value, options: &CheckerOptions) -> Result<bool, PredicateError> {
        match self {
            ValueGuard::Typeof(kind) => Ok(value.type_of() == *kind),
            ValueGuard::InProperty(name) => match value {
                Value::Object(map) => Ok(map.contains_key(name)),
                Value::Array(_) | Value::Function(_) => Ok(false),
                _ => Err(PredicateError::new(format!(
                    "cannot use 'in' operator to search for '{}' in {}",
                    name,
                    value.kind_name()
                ))),
            },
            ValueGuard::Callable(name) => {
                Ok(matches!(value.get_defined(name), Some(Value::Function(_))))
            }
            ValueGuard::Discriminant { property, value: literal } => Ok(value
                .get(property)
                .is_some_and(|found| found.matches_literal(literal))),
            ValueGuard::Conforms(shape) => Ok(conforms_to_shape(value, shape, options).is_ok()),
            ValueGuard::Truthy => Ok(value.is_truthy()),
            ValueGuard::All(guards) => {
                for guard in guards {
                    if !guard.evaluate(value, options)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            ValueGuard::Any(guards) => {
                for guard in guards {
                    if guard.evaluate(value, options)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            ValueGuard::Not(inner) => Ok(!inner.evaluate(value, options)?),
            ValueGuard::Custom(predicate) => Ok(predicate(value)),
            ValueGuard::Fallible(predicate) => predicate(value),
        }
    }
}

impl fmt::Debug for ValueGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueGuard::Typeof(kind) => f.debug_tuple("Typeof").field(kind).finish(),
            ValueGuard::InProperty(name) => f.debug_tuple("InProperty").field(name).finish(),
            ValueGuard::Callable(name) => f.debug_tuple("Callable").field(name).finish(),
            ValueGuard::Discriminant { property, value } => f
                .debug_struct("Discriminant")
                .field("property", property)
                .field("value", value)
                .finish(),
            ValueGuard::Conforms(shape) => write!(f, "Conforms({})", shape),
            ValueGuard::Truthy => f.write_str("Truthy"),
            ValueGuard::All(guards) => f.debug_tuple("All").field(guards).finish(),
            ValueGuard::Any(guards) => f.debug_tuple("Any").field(guards).finish(),
            ValueGuard::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            ValueGuard::Custom(_) => f.write_str("Custom(..)"),
            ValueGuard::Fallible(_) => f.write_str("Fallible(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct VariantRegistration {
    pub tag: VariantTag,
    pub shape: Arc<ShapeDescriptor>,
    pub guard: ValueGuard,
}

/// Collects registrations; `build` freezes them into an engine.
#[derive(Debug, Default)]
pub struct NarrowingEngineBuilder {
    registrations: Vec<VariantRegistration>,
    seen: FxHashSet<VariantTag>,
    options: CheckerOptions,
}

impl NarrowingEngineBuilder {
    pub fn new() -> Self {
        NarrowingEngineBuilder::default()
    }

    pub fn with_options(mut self, options: CheckerOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a variant. Registration order is evaluation order.
    pub fn register(
        mut self,
        tag: impl Into<VariantTag>,
        shape: impl Into<Arc<ShapeDescriptor>>,
        guard: ValueGuard,
    ) -> Result<Self, NarrowError> {
        let tag = tag.into();
        if !self.seen.insert(tag.clone()) {
            return Err(NarrowError::DuplicateVariant(tag));
        }
        self.registrations.push(VariantRegistration {
            tag,
            shape: shape.into(),
            guard,
        });
        Ok(self)
    }

    pub fn build(self) -> NarrowingEngine {
        debug!(variants = self.registrations.len(), "narrowing engine built");
        NarrowingEngine {
            registrations: self.registrations.into(),
            options: self.options,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NarrowState {
    Init,
    Evaluating(usize),
    Matched(usize),
    Exhausted,
}

/// Read-only after construction; share it freely across threads.
#[derive(Clone, Debug)]
pub struct NarrowingEngine {
    registrations: Arc<[VariantRegistration]>,
    options: CheckerOptions,
}

impl NarrowingEngine {
    pub fn builder() -> NarrowingEngineBuilder {
        NarrowingEngineBuilder::new()
    }

    pub fn registrations(&self) -> &[VariantRegistration] {
        &self.registrations
    }

    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    /// Tag of the first variant whose guard accepts `value`.
    pub fn narrow(&self, value: &Value) -> Result<&VariantTag, NarrowError> {
        self.narrow_registration(value).map(|registration| &registration.tag)
    }

    /// Like [`narrow`](Self::narrow), returning the whole registration so the
    /// caller also gets the variant's shape.
    pub fn narrow_registration(&self, value: &Value) -> Result<&VariantRegistration, NarrowError> {
        let _span = span!(
            Level::TRACE,
            "narrow",
            kind = value.kind_name(),
            variants = self.registrations.len()
        )
        .entered();

        let mut state = NarrowState::Init;
        loop {
            state = match state {
                NarrowState::Init => NarrowState::Evaluating(0),
                NarrowState::Evaluating(index) => match self.registrations.get(index) {
                    None => NarrowState::Exhausted,
                    Some(registration) => match registration.guard.evaluate(value, &self.options) {
                        Ok(true) => NarrowState::Matched(index),
                        Ok(false) => NarrowState::Evaluating(index + 1),
                        Err(cause) => {
                            debug!(tag = %registration.tag, %cause, "guard failed");
                            return Err(NarrowError::PredicateFailure {
                                tag: registration.tag.clone(),
                                cause,
                            });
                        }
                    },
                },
                NarrowState::Matched(index) => {
                    let Some(registration) = self.registrations.get(index) else {
                        break;
                    };
                    if self.options.verify_variant_shapes {
                        conforms_to_shape(value, &registration.shape, &self.options).map_err(
                            |violation| NarrowError::ShapeAssertion {
                                tag: registration.tag.clone(),
                                violation,
                            },
                        )?;
                    }
                    trace!(tag = %registration.tag, "matched");
                    return Ok(registration);
                }
                NarrowState::Exhausted => break,
            };
        }

        trace!("no variant matched");
        Err(NarrowError::NoMatch)
    }

    /// Lazily keep the values that narrow to `tag`, in input order.
    ///
    /// Values no variant accepts are skipped. Any other narrowing error is
    /// yielded in place of the value. Cloning the returned iterator before
    /// consuming it gives an independent pass that re-runs every guard.
    pub fn filter_by_variant<I>(
        &self,
        values: I,
        tag: impl Into<VariantTag>,
    ) -> FilterByVariant<'_, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Borrow<Value>,
    {
        FilterByVariant {
            engine: self,
            tag: tag.into(),
            values: values.into_iter(),
        }
    }

    /// Fill omitted fields of `supplied` from `cascade`. See
    /// [`defaults::resolve_defaults`].
    pub fn resolve_defaults(
        &self,
        supplied: Option<&Value>,
        cascade: &DefaultCascade,
    ) -> Result<Value, DefaultsError> {
        defaults::resolve_defaults(supplied, cascade, &self.options)
    }
}

/// Iterator returned by [`NarrowingEngine::filter_by_variant`].
#[derive(Clone, Debug)]
pub struct FilterByVariant<'e, I> {
    engine: &'e NarrowingEngine,
    tag: VariantTag,
    values: I,
}

impl<I> Iterator for FilterByVariant<'_, I>
where
    I: Iterator,
    I::Item: Borrow<Value>,
{
    type Item = Result<I::Item, NarrowError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.values.next()?;
            match self.engine.narrow(item.borrow()) {
                Ok(tag) if *tag == self.tag => return Some(Ok(item)),
                Ok(_) | Err(NarrowError::NoMatch) => {}
                Err(err) => return Some(Err(err)),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.values.size_hint().1)
    }
}

#[cfg(test)]
#[path = "../tests/narrowing_tests.rs"]
mod tests;
