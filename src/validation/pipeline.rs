//! Validation entry point.

use crate::core::candidate::Candidate;
use crate::core::error::{ValidationReport, ValidationResult};
use crate::validation::functional::validate_functional;
use crate::validation::structural::validate_structural;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Validate one candidate.
///
/// A bare callable is checked against the functional form; a surface
/// against the structural form. The result is all-or-nothing: a complete
/// descriptor, or every violated rule.
pub fn validate(candidate: &Candidate) -> ValidationResult {
    let result = match candidate {
        Candidate::Functional(f) => validate_functional(f),
        Candidate::Structural(s) => validate_structural(s),
    };

    match &result {
        Ok(descriptor) => log::debug!("✓ {}", descriptor),
        Err(failure) => log::debug!(
            "✗ '{}' ({}) failed with {} diagnostic(s)",
            candidate.name(),
            candidate.form(),
            failure.diagnostics.len()
        ),
    }
    result
}

/// Batch validation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorOptions {
    /// Validate independent candidates in parallel.
    pub parallel: bool,
    /// Maximum number of worker threads (0 = rayon's global pool).
    pub max_threads: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: 0,
        }
    }
}

/// Validates batches of independent candidates.
///
/// Validation of one candidate shares nothing with another, so a batch can
/// be spread across threads; results always come back in input order.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidatorOptions,
}

impl Validator {
    /// Create a validator with the given options.
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validate one candidate.
    pub fn validate(&self, candidate: &Candidate) -> ValidationResult {
        validate(candidate)
    }

    /// Validate every candidate, preserving input order.
    pub fn validate_all(&self, candidates: &[Candidate]) -> Vec<ValidationResult> {
        if !self.options.parallel || candidates.len() < 2 {
            return candidates.iter().map(validate).collect();
        }

        if self.options.max_threads > 0 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.max_threads)
                .build()
            {
                Ok(pool) => return pool.install(|| candidates.par_iter().map(validate).collect()),
                Err(e) => log::warn!("Falling back to the global thread pool: {}", e),
            }
        }

        candidates.par_iter().map(validate).collect()
    }

    /// Validate every candidate into a report.
    pub fn report(&self, candidates: &[Candidate]) -> ValidationReport {
        let start = Instant::now();
        let mut report = ValidationReport::new();

        for result in self.validate_all(candidates) {
            report.record(&result);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::candidate::{Form, OperationHandle, Surface};
    use crate::core::descriptor::CombineDescriptor;
    use crate::core::error::{CandidateOutcome, ValidationFailure};
    use crate::signature;

    fn handle() -> OperationHandle {
        OperationHandle::new(())
    }

    fn batch() -> Vec<Candidate> {
        (0..16)
            .map(|i| {
                if i % 2 == 0 {
                    Candidate::functional(format!("sum{}", i), signature!(fn(i64, i64) -> i64), handle())
                } else {
                    Candidate::functional(format!("bad{}", i), signature!(fn(i64, String) -> i64), handle())
                }
            })
            .collect()
    }

    #[test]
    fn test_dispatches_on_form() {
        let functional = Candidate::functional("sum", signature!(fn(i64, i64) -> i64), handle());
        assert_eq!(validate(&functional).unwrap().form(), Form::Functional);

        let structural = Candidate::structural(Surface::new("mean").export(
            "MergeAccumulators",
            signature!(fn(i64, i64) -> i64),
            handle(),
        ));
        assert_eq!(validate(&structural).unwrap().form(), Form::Structural);
    }

    #[test]
    fn test_results_are_send_and_sync() {
        fn check<T: Send + Sync>() {}
        check::<Candidate>();
        check::<CombineDescriptor>();
        check::<ValidationFailure>();
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let candidates = batch();
        let parallel = Validator::default().validate_all(&candidates);
        let sequential = Validator::new(ValidatorOptions {
            parallel: false,
            max_threads: 0,
        })
        .validate_all(&candidates);

        assert_eq!(parallel.len(), sequential.len());
        for (i, (p, s)) in parallel.iter().zip(&sequential).enumerate() {
            assert_eq!(p.is_ok(), s.is_ok());
            assert_eq!(p.is_ok(), i % 2 == 0);
        }
    }

    #[test]
    fn test_bounded_pool_keeps_order() {
        let candidates = batch();
        let results = Validator::new(ValidatorOptions {
            parallel: true,
            max_threads: 2,
        })
        .validate_all(&candidates);

        for (candidate, result) in candidates.iter().zip(&results) {
            match result {
                Ok(desc) => assert_eq!(desc.name(), candidate.name()),
                Err(failure) => assert_eq!(failure.candidate, candidate.name()),
            }
        }
    }

    #[test]
    fn test_report_counts() {
        let report = Validator::default().report(&batch());
        assert!(!report.success);
        assert_eq!(report.valid_count(), 8);
        assert_eq!(report.invalid_count(), 8);
        assert!(matches!(report.outcomes[0], CandidateOutcome::Valid { .. }));
        assert!(matches!(report.outcomes[1], CandidateOutcome::Invalid { .. }));
    }

    #[test]
    fn test_options_from_toml() {
        let options: ValidatorOptions = toml::from_str("max_threads = 4").unwrap();
        assert!(options.parallel);
        assert_eq!(options.max_threads, 4);
        assert!(toml::from_str::<ValidatorOptions>("threads = 4").is_err());
    }
}
