//! Signature compatibility and overload-implementation validation.
//!
//! A candidate signature satisfies a required signature when the required
//! side can be called with any argument list the candidate accepts:
//!
//! - the candidate may not demand more arguments than the required side
//!   declares (fewer is fine, more is not);
//! - parameter types at every shared position must be compatible;
//! - every required-side parameter past the candidate's last parameter must
//!   be optional;
//! - return types must be compatible.
//!
//! ```typescript
//! function makeDate(timestamp: number): Date;
//! function makeDate(m: number, d: number, y: number): Date;
//! function makeDate(mOrTimestamp: number, d?: number, y?: number): Date { ... }
//! ```

use tracing::{Level, debug, span, trace};

use shapecheck_common::{CheckerOptions, ParameterVariance};

use crate::diagnostics::{CompatFailureReason, CompatTracer, DiagnosticTracer, FastTracer};
use crate::errors::CompatError;
use crate::schema::{OverloadSet, SignatureDescriptor};
use crate::subtype::SubtypeChecker;
use crate::types::TypeTag;

/// How return types are related.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReturnRelation {
    /// The candidate's return must be assignable to the required return:
    /// exact match, or the required return is a union containing it.
    Covariant,
    /// Either side may be the wider one. Overload implementations use this,
    /// so `void | Promise<string>` serves both a `void` and a
    /// `Promise<string>` overload.
    Either,
}

impl SubtypeChecker<'_> {
    /// Function-type assignability as used inside structural comparison.
    pub(crate) fn check_signature_fast(
        &mut self,
        candidate: &SignatureDescriptor,
        required: &SignatureDescriptor,
    ) -> bool {
        self.check_signature(candidate, required, ReturnRelation::Covariant, &mut FastTracer)
    }

    pub(crate) fn check_signature<T: CompatTracer>(
        &mut self,
        candidate: &SignatureDescriptor,
        required: &SignatureDescriptor,
        returns: ReturnRelation,
        tracer: &mut T,
    ) -> bool {
        let candidate_params = candidate.params();
        let required_params = required.params();

        let candidate_required = candidate.required_param_count();
        if candidate_required > required_params.len() {
            trace!(
                candidate_required,
                required_declared = required_params.len(),
                "candidate demands too many arguments"
            );
            if !tracer.on_mismatch(|| CompatFailureReason::TooManyParameters {
                candidate_required,
                required_declared: required_params.len(),
            }) {
                return false;
            }
        }

        for (index, (c, r)) in candidate_params.iter().zip(required_params).enumerate() {
            if !self.are_parameters_compatible(&c.value_kind, &r.value_kind) {
                trace!(index, "parameter type mismatch");
                if !tracer.on_mismatch(|| CompatFailureReason::ParameterTypeMismatch {
                    index,
                    candidate_param: c.value_kind.clone(),
                    required_param: r.value_kind.clone(),
                }) {
                    return false;
                }
            }
        }

        if let Some(uncovered) = required_params
            .iter()
            .skip(candidate_params.len())
            .find(|param| !param.optional)
        {
            let index = uncovered.position;
            trace!(index, "required parameter not covered by candidate");
            if !tracer.on_mismatch(|| CompatFailureReason::UncoveredRequiredParameter { index }) {
                return false;
            }
        }

        let candidate_return = &candidate.return_type().value_kind;
        let required_return = &required.return_type().value_kind;
        if !self.are_returns_compatible(candidate_return, required_return, returns) {
            trace!(%candidate_return, %required_return, "return type mismatch");
            if !tracer.on_mismatch(|| CompatFailureReason::ReturnTypeMismatch {
                candidate_return: candidate_return.clone(),
                required_return: required_return.clone(),
            }) {
                return false;
            }
        }

        true
    }

    fn are_parameters_compatible(&mut self, candidate: &TypeTag, required: &TypeTag) -> bool {
        match self.options.parameter_variance {
            ParameterVariance::Equivalent => self.is_equivalent(candidate, required),
            ParameterVariance::Contravariant => self.is_assignable(required, candidate),
            ParameterVariance::Bivariant => {
                self.is_assignable(required, candidate) || self.is_assignable(candidate, required)
            }
        }
    }

    fn are_returns_compatible(
        &mut self,
        candidate: &TypeTag,
        required: &TypeTag,
        relation: ReturnRelation,
    ) -> bool {
        match relation {
            ReturnRelation::Covariant => self.is_assignable(candidate, required),
            ReturnRelation::Either => {
                self.is_assignable(candidate, required) || self.is_assignable(required, candidate)
            }
        }
    }
}

/// Public entry point for signature compatibility queries.
pub struct CompatChecker<'a> {
    options: &'a CheckerOptions,
}

impl<'a> CompatChecker<'a> {
    pub fn new(options: &'a CheckerOptions) -> Self {
        CompatChecker { options }
    }

    /// Can a function with signature `candidate` be used where `required` is
    /// expected?
    pub fn is_compatible(
        &self,
        candidate: &SignatureDescriptor,
        required: &SignatureDescriptor,
    ) -> bool {
        SubtypeChecker::new(self.options).check_signature(
            candidate,
            required,
            ReturnRelation::Covariant,
            &mut FastTracer,
        )
    }

    /// Explain why `candidate` is not compatible with `required`.
    ///
    /// Returns `None` if the signatures are compatible.
    pub fn explain_failure(
        &self,
        candidate: &SignatureDescriptor,
        required: &SignatureDescriptor,
    ) -> Option<CompatFailureReason> {
        let mut tracer = DiagnosticTracer::new();
        SubtypeChecker::new(self.options).check_signature(
            candidate,
            required,
            ReturnRelation::Covariant,
            &mut tracer,
        );
        tracer.take_failure()
    }

    /// Check the implementation signature against every declared overload.
    ///
    /// Each overload plays the required side and the implementation the
    /// candidate. All overloads are checked independently; the first failing
    /// index in declaration order is reported.
    pub fn validate_implementation(&self, set: &OverloadSet) -> Result<(), CompatError> {
        let _span = span!(
            Level::DEBUG,
            "validate_implementation",
            overloads = set.overloads().len()
        )
        .entered();

        let implementation = set.implementation();
        for (index, overload) in set.overloads().iter().enumerate() {
            let mut tracer = DiagnosticTracer::new();
            let ok = SubtypeChecker::new(self.options).check_signature(
                implementation,
                overload,
                ReturnRelation::Either,
                &mut tracer,
            );
            if !ok {
                let reason = tracer.take_failure().unwrap_or_else(|| {
                    CompatFailureReason::ReturnTypeMismatch {
                        candidate_return: implementation.return_type().value_kind.clone(),
                        required_return: overload.return_type().value_kind.clone(),
                    }
                });
                debug!(index, %reason, "implementation incompatible with overload");
                return Err(CompatError::IncompatibleImplementation { index, reason });
            }
            trace!(index, "overload satisfied");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/compat_tests.rs"]
mod tests;
