//! Failure reasons for signature compatibility, and the tracer that collects them.
//!
//! The same checking code serves both the fast boolean path and the
//! explanation path. Reasons are built lazily through a closure, so
//! [`FastTracer`] never allocates one, while [`DiagnosticTracer`] keeps the
//! first reason it is offered.

use std::fmt;

use crate::types::TypeTag;

/// Structured reason why a candidate signature does not satisfy a required one.
#[derive(Clone, Debug, PartialEq)]
pub enum CompatFailureReason {
    /// The candidate demands more arguments than the required side declares.
    TooManyParameters {
        candidate_required: usize,
        required_declared: usize,
    },
    /// Parameter types at a shared position are not compatible.
    ParameterTypeMismatch {
        index: usize,
        candidate_param: TypeTag,
        required_param: TypeTag,
    },
    /// The required side has a non-optional parameter past the candidate's
    /// last parameter.
    UncoveredRequiredParameter { index: usize },
    ReturnTypeMismatch {
        candidate_return: TypeTag,
        required_return: TypeTag,
    },
}

impl fmt::Display for CompatFailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatFailureReason::TooManyParameters {
                candidate_required,
                required_declared,
            } => write!(
                f,
                "candidate requires {} parameter(s) but only {} are declared",
                candidate_required, required_declared
            ),
            CompatFailureReason::ParameterTypeMismatch {
                index,
                candidate_param,
                required_param,
            } => write!(
                f,
                "parameter {} has type '{}' but '{}' is required",
                index, candidate_param, required_param
            ),
            CompatFailureReason::UncoveredRequiredParameter { index } => write!(
                f,
                "required parameter {} has no counterpart in the candidate",
                index
            ),
            CompatFailureReason::ReturnTypeMismatch {
                candidate_return,
                required_return,
            } => write!(
                f,
                "return type '{}' is not compatible with '{}'",
                candidate_return, required_return
            ),
        }
    }
}

/// A trait for tracing compatibility failures.
pub trait CompatTracer {
    /// Called when a mismatch is detected.
    ///
    /// Returns `true` if checking should continue, `false` to stop.
    fn on_mismatch(&mut self, reason: impl FnOnce() -> CompatFailureReason) -> bool;
}

/// Tracer that stops at the first mismatch without building a reason.
#[derive(Clone, Copy, Debug)]
pub struct FastTracer;

impl CompatTracer for FastTracer {
    #[inline(always)]
    fn on_mismatch(&mut self, _reason: impl FnOnce() -> CompatFailureReason) -> bool {
        false
    }
}

/// Tracer that records the first failure reason and stops.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticTracer {
    failure: Option<CompatFailureReason>,
}

impl DiagnosticTracer {
    pub fn new() -> Self {
        DiagnosticTracer::default()
    }

    pub fn take_failure(&mut self) -> Option<CompatFailureReason> {
        self.failure.take()
    }

    pub fn has_failure(&self) -> bool {
        self.failure.is_some()
    }
}

impl CompatTracer for DiagnosticTracer {
    fn on_mismatch(&mut self, reason: impl FnOnce() -> CompatFailureReason) -> bool {
        if self.failure.is_none() {
            self.failure = Some(reason());
        }
        false
    }
}
