//! Centralized limits and thresholds for the shapecheck engine.
//!
//! Shapes, cascades and runtime values are all trees, so every recursive
//! walk over them is bounded by a depth limit. Keeping the limits here:
//! - Prevents duplicate definitions with inconsistent values
//! - Gives `CheckerOptions` a single place to take its defaults from

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum depth for structural comparison of type tags.
///
/// Shape references nest (`{ owner: { address: { street: string } } }`), and
/// function types embed signatures whose parameters are shapes again. The
/// relation walk gives up and reports "not compatible" past this depth.
///
/// ```typescript
/// type A = { b: { c: { d: { e: string } } } };
/// declare let a: A;
/// declare let b: { b: { c: { d: { e: string, f: number } } } };
/// a = b; // compared one level at a time down to `e`
/// ```
pub const MAX_STRUCTURAL_DEPTH: u32 = 64;

/// Maximum nesting of default cascades.
///
/// ```typescript
/// function f({ a: { b: { c = 1 } = {} } = {} } = {}) {}
/// ```
///
/// Each `= {}` layer is one cascade level.
pub const MAX_CASCADE_DEPTH: u32 = 32;

/// Maximum depth for checking a runtime value against a shape.
pub const MAX_CONFORMANCE_DEPTH: u32 = 64;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Inline capacity for union member lists.
///
/// Most unions in practice are `T | undefined` or `void | T`.
pub const UNION_INLINE_MEMBERS: usize = 4;

/// Inline capacity for signature parameter lists.
pub const SIGNATURE_INLINE_PARAMS: usize = 4;
