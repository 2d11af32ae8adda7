//! Functional form: a bare callable that is itself the merge.

use crate::core::candidate::FunctionalCandidate;
use crate::core::descriptor::CombineDescriptor;
use crate::core::error::{Diagnostic, Side, Slot, ValidationResult};
use crate::core::operation::{Operation, OperationKind};
use crate::core::types::TypeDescriptor;
use crate::validation::diagnostics::Diagnostics;
use crate::validation::inspector::bind;

/// Validate a bare callable as `fn(T, T) -> T`.
///
/// Any deviation is reported as a single `NonBinaryMerge` diagnostic.
pub fn validate_functional(candidate: &FunctionalCandidate) -> ValidationResult {
    let merge_name = OperationKind::MergeAccumulators.name();
    let mut diagnostics = Diagnostics::new();

    let Some(merge) = bind(candidate, merge_name) else {
        diagnostics.push(Diagnostic::MissingMandatoryOperation {
            operation: merge_name.to_string(),
        });
        return Err(diagnostics.into_failure(&candidate.name));
    };

    match check_merge(merge.operation()) {
        Ok(accumulator) => {
            log::debug!("'{}' is a functional combine over {}", candidate.name, accumulator);
            Ok(CombineDescriptor::functional(&candidate.name, accumulator, merge))
        }
        Err(_) => {
            diagnostics.push(Diagnostic::NonBinaryMerge {
                operation: merge_name.to_string(),
                actual: merge.operation().shape(),
            });
            Err(diagnostics.into_failure(&candidate.name))
        }
    }
}

/// Check a normalized merge operation and return its accumulator type.
///
/// Shared by both forms. Reports arity problems on each side and type
/// disagreements between the two parameters and between parameter and
/// return.
pub(crate) fn check_merge(operation: &Operation) -> Result<TypeDescriptor, Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    let name = &operation.name;

    if operation.params.len() != 2 {
        diagnostics.push(Diagnostic::ArityMismatch {
            operation: name.clone(),
            side: Side::Parameters,
            expected: 2,
            actual: operation.params.len(),
        });
    }
    if operation.returns.len() != 1 {
        diagnostics.push(Diagnostic::ArityMismatch {
            operation: name.clone(),
            side: Side::Returns,
            expected: 1,
            actual: operation.returns.len(),
        });
    }

    if let [first, second] = operation.params.as_slice() {
        if first != second {
            diagnostics.push(Diagnostic::TypeMismatch {
                operation: name.clone(),
                slot: Slot::Parameter(1),
                expected: first.to_string(),
                actual: second.to_string(),
            });
        } else if let [ret] = operation.returns.as_slice() {
            if ret != first {
                diagnostics.push(Diagnostic::TypeMismatch {
                    operation: name.clone(),
                    slot: Slot::Return(0),
                    expected: first.to_string(),
                    actual: ret.to_string(),
                });
            }
        }
    }

    if diagnostics.is_empty() {
        Ok(operation.params[0].clone())
    } else {
        Err(diagnostics)
    }
}
