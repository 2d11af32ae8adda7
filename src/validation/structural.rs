//! Structural form: a surface exposing up to four named operations.
//!
//! Verifies:
//! - Only recognized operation names are exported
//! - `MergeAccumulators` exists and is `fn(A, A) -> A`
//! - `CreateAccumulator` is `fn() -> A`
//! - `AddInput` is `fn(A, I) -> A`
//! - `ExtractOutput` is `fn(A) -> O`
//!
//! Every check runs even after an earlier one fails.

use crate::core::candidate::Surface;
use crate::core::descriptor::{CombineDescriptor, StructuralParts};
use crate::core::error::{Diagnostic, Side, Slot, ValidationResult};
use crate::core::operation::{Operation, OperationKind};
use crate::core::types::TypeDescriptor;
use crate::validation::diagnostics::Diagnostics;
use crate::validation::functional::check_merge;
use crate::validation::inspector::bind;

/// Validate a named-operation surface.
pub fn validate_structural(surface: &Surface) -> ValidationResult {
    let mut diagnostics = Diagnostics::new();

    for member in surface.exported_members() {
        if OperationKind::from_name(&member.name).is_none() {
            diagnostics.push(Diagnostic::UnrecognizedMember {
                operation: member.name.clone(),
                actual: member.signature.to_string(),
            });
        }
    }

    let merge = bind(surface, OperationKind::MergeAccumulators.name());
    let accumulator = match &merge {
        None => {
            diagnostics.push(Diagnostic::MissingMandatoryOperation {
                operation: OperationKind::MergeAccumulators.name().to_string(),
            });
            None
        }
        Some(bound) => match check_merge(bound.operation()) {
            Ok(accumulator) => Some(accumulator),
            Err(found) => {
                diagnostics.extend(found);
                None
            }
        },
    };

    if accumulator.is_none() {
        log::debug!(
            "'{}' has no usable merge; accumulator slots of other operations are not unified",
            surface.name()
        );
    }
    let acc = accumulator.as_ref();

    let create = bind(surface, OperationKind::CreateAccumulator.name());
    if let Some(bound) = &create {
        check_create(bound.operation(), acc, &mut diagnostics);
    }

    let add_input = bind(surface, OperationKind::AddInput.name());
    let input = add_input
        .as_ref()
        .and_then(|bound| check_add_input(bound.operation(), acc, &mut diagnostics));

    let extract_output = bind(surface, OperationKind::ExtractOutput.name());
    let output = extract_output
        .as_ref()
        .and_then(|bound| check_extract_output(bound.operation(), acc, &mut diagnostics));

    // A missing or malformed merge always leaves a diagnostic behind.
    let (Some(merge), Some(accumulator)) = (merge, accumulator) else {
        return Err(diagnostics.into_failure(surface.name()));
    };
    if !diagnostics.is_empty() {
        return Err(diagnostics.into_failure(surface.name()));
    }

    let parts = StructuralParts {
        input: input.unwrap_or_else(|| accumulator.clone()),
        output: output.unwrap_or_else(|| accumulator.clone()),
        accumulator,
        merge,
        create,
        add_input,
        extract_output,
    };
    let descriptor = CombineDescriptor::structural(surface.name(), parts);
    log::debug!("'{}' is a structural combine: {}", surface.name(), descriptor);
    Ok(descriptor)
}

/// `CreateAccumulator() -> A`
fn check_create(op: &Operation, acc: Option<&TypeDescriptor>, diagnostics: &mut Diagnostics) {
    check_arity(op, Side::Parameters, 0, diagnostics);
    if check_arity(op, Side::Returns, 1, diagnostics) {
        check_slot(op, Slot::Return(0), &op.returns[0], acc, diagnostics);
    }
}

/// `AddInput(A, I) -> A`. Returns `I` when the parameter count is right.
fn check_add_input(
    op: &Operation,
    acc: Option<&TypeDescriptor>,
    diagnostics: &mut Diagnostics,
) -> Option<TypeDescriptor> {
    let input = if check_arity(op, Side::Parameters, 2, diagnostics) {
        check_slot(op, Slot::Parameter(0), &op.params[0], acc, diagnostics);
        Some(op.params[1].clone())
    } else {
        None
    };
    if check_arity(op, Side::Returns, 1, diagnostics) {
        check_slot(op, Slot::Return(0), &op.returns[0], acc, diagnostics);
    }
    input
}

/// `ExtractOutput(A) -> O`. Returns `O` when the return count is right.
fn check_extract_output(
    op: &Operation,
    acc: Option<&TypeDescriptor>,
    diagnostics: &mut Diagnostics,
) -> Option<TypeDescriptor> {
    if check_arity(op, Side::Parameters, 1, diagnostics) {
        check_slot(op, Slot::Parameter(0), &op.params[0], acc, diagnostics);
    }
    check_arity(op, Side::Returns, 1, diagnostics).then(|| op.returns[0].clone())
}

/// Record an arity violation; `true` when the count matches.
fn check_arity(op: &Operation, side: Side, expected: usize, diagnostics: &mut Diagnostics) -> bool {
    let actual = match side {
        Side::Parameters => op.params.len(),
        Side::Returns => op.returns.len(),
    };
    if actual != expected {
        diagnostics.push(Diagnostic::ArityMismatch {
            operation: op.name.clone(),
            side,
            expected,
            actual,
        });
    }
    actual == expected
}

/// Record a mismatch between an accumulator slot and the accumulator type.
/// Skipped when no accumulator type was established.
fn check_slot(
    op: &Operation,
    slot: Slot,
    found: &TypeDescriptor,
    acc: Option<&TypeDescriptor>,
    diagnostics: &mut Diagnostics,
) {
    if let Some(acc) = acc {
        if found != acc {
            diagnostics.push(Diagnostic::TypeMismatch {
                operation: op.name.clone(),
                slot,
                expected: acc.to_string(),
                actual: found.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::candidate::OperationHandle;
    use crate::core::error::Rule;
    use crate::core::types::{Context, Failure};
    use crate::signature;
    use std::sync::Arc;

    struct MyAccum;

    fn handle() -> OperationHandle {
        OperationHandle::new(())
    }

    fn good_merge() -> Arc<Surface> {
        Arc::new(Surface::new("GoodMerge").export(
            "MergeAccumulators",
            signature!(fn(MyAccum, MyAccum) -> MyAccum),
            handle(),
        ))
    }

    fn embedding(name: &str) -> Surface {
        Surface::new(name).delegate_to(good_merge())
    }

    fn rules(surface: &Surface) -> Vec<(String, Rule)> {
        validate_structural(surface)
            .unwrap_err()
            .diagnostics
            .iter()
            .map(|d| (d.operation().to_string(), d.rule()))
            .collect()
    }

    #[test]
    fn test_full_surface() {
        let surface = Surface::new("GoodCombineFn")
            .export("MergeAccumulators", signature!(fn(MyAccum, MyAccum) -> MyAccum), handle())
            .export("CreateAccumulator", signature!(fn() -> MyAccum), handle())
            .export("AddInput", signature!(fn(MyAccum, i32) -> MyAccum), handle())
            .export("ExtractOutput", signature!(fn(MyAccum) -> i64), handle());

        let desc = validate_structural(&surface).unwrap();
        assert_eq!(desc.accumulator_type(), &TypeDescriptor::of::<MyAccum>());
        assert_eq!(desc.input_type(), &TypeDescriptor::of::<i32>());
        assert_eq!(desc.output_type(), &TypeDescriptor::of::<i64>());
        assert_eq!(desc.operations().count(), 4);
    }

    #[test]
    fn test_merge_only_defaults_input_and_output() {
        let desc = validate_structural(&embedding("MergeOnly")).unwrap();
        assert_eq!(desc.input_type(), desc.accumulator_type());
        assert_eq!(desc.output_type(), desc.accumulator_type());
        assert!(desc.create_accumulator().is_none());
        assert!(desc.add_input().is_none());
        assert!(desc.extract_output().is_none());
    }

    #[test]
    fn test_context_on_every_operation() {
        let surface = Surface::new("GoodWContextCombineFn")
            .export("MergeAccumulators", signature!(fn(Context, MyAccum, MyAccum) -> MyAccum), handle())
            .export("CreateAccumulator", signature!(fn(Context) -> MyAccum), handle())
            .export("AddInput", signature!(fn(Context, MyAccum, i32) -> MyAccum), handle())
            .export("ExtractOutput", signature!(fn(Context, MyAccum) -> i64), handle());

        let desc = validate_structural(&surface).unwrap();
        assert!(desc.operations().all(|(_, op)| op.accepts_context()));
    }

    #[test]
    fn test_failure_returns_on_optional_operations() {
        let surface = embedding("Fallible")
            .export("CreateAccumulator", signature!(fn() -> (MyAccum, Failure)), handle())
            .export("AddInput", signature!(fn(MyAccum, i32) -> (MyAccum, Failure)), handle())
            .export("ExtractOutput", signature!(fn(Context, MyAccum) -> (i64, Failure)), handle());

        let desc = validate_structural(&surface).unwrap();
        assert!(desc.create_accumulator().unwrap().returns_failure());
        assert!(!desc.merge().returns_failure());
    }

    #[test]
    fn test_missing_merge() {
        let surface = Surface::new("NoMerge").export("CreateAccumulator", signature!(fn() -> String), handle());
        assert_eq!(
            rules(&surface),
            vec![("MergeAccumulators".to_string(), Rule::MissingMandatoryOperation)]
        );
    }

    #[test]
    fn test_non_homogeneous_merge_shadowing_base() {
        let surface = embedding("NonBinary").export("MergeAccumulators", signature!(fn(i64, String) -> i64), handle());
        let failure = validate_structural(&surface).unwrap_err();
        assert_eq!(failure.diagnostics.len(), 1);
        let d = &failure.diagnostics[0];
        assert_eq!(d.rule(), Rule::TypeMismatch);
        assert_eq!(d.expected(), "i64");
        assert_eq!(d.actual(), "String");
    }

    #[test]
    fn test_mismatched_accumulator_slots() {
        let cases = vec![
            ("CreateAccumulator", signature!(fn() -> String), 1),
            ("AddInput", signature!(fn(String, i32) -> MyAccum), 1),
            ("AddInput", signature!(fn(MyAccum, i32) -> String), 1),
            ("AddInput", signature!(fn(String, i32) -> String), 2),
            ("ExtractOutput", signature!(fn(String) -> i32), 1),
        ];
        for (name, sig, count) in cases {
            let text = sig.to_string();
            let surface = embedding("Mismatched").export(name, sig, handle());
            let found = rules(&surface);
            assert_eq!(found.len(), count, "{} {}", name, text);
            assert!(found.iter().all(|(op, rule)| op == name && *rule == Rule::TypeMismatch));
        }
    }

    #[test]
    fn test_invalid_arities() {
        let cases = vec![
            ("CreateAccumulator", signature!(fn(Context, String) -> i32)),
            ("CreateAccumulator", signature!(fn(String) -> i32)),
            ("CreateAccumulator", signature!(fn() -> (MyAccum, String))),
            ("CreateAccumulator", signature!(fn() -> (String, MyAccum))),
            ("AddInput", signature!(fn(Context, String) -> i32)),
            ("AddInput", signature!(fn(String) -> i32)),
            ("AddInput", signature!(fn(Context, String, String, String) -> i32)),
            ("AddInput", signature!(fn(MyAccum, String) -> (i32, i32, i32))),
            ("ExtractOutput", signature!(fn(MyAccum, String) -> (i32, i32, i32))),
            ("ExtractOutput", signature!(fn() -> (i32, i32, i32))),
            ("ExtractOutput", signature!(fn(Context, MyAccum, i32) -> i32)),
        ];
        for (name, sig) in cases {
            let text = sig.to_string();
            let surface = embedding("Invalid").export(name, sig, handle());
            let found = rules(&surface);
            assert!(
                found.iter().any(|(op, rule)| op == name && *rule == Rule::ArityMismatch),
                "{} {}: {:?}",
                name,
                text,
                found
            );
        }
    }

    #[test]
    fn test_extra_exported_member() {
        let surface = embedding("Extra").export("ExtraMethod", signature!(fn(String) -> i32), handle());
        assert_eq!(rules(&surface), vec![("ExtraMethod".to_string(), Rule::UnrecognizedMember)]);
    }

    #[test]
    fn test_unexported_member_ignored() {
        let surface = embedding("Helper").private("helper", signature!(fn(Context, String) -> String), handle());
        assert!(validate_structural(&surface).is_ok());
    }

    #[test]
    fn test_private_member_does_not_hide_delegated_merge() {
        let surface = embedding("PrivateMerge").private("MergeAccumulators", signature!(fn(String) -> String), handle());
        let descriptor = validate_structural(&surface).unwrap();
        assert_eq!(descriptor.accumulator_type(), &TypeDescriptor::of::<MyAccum>());
    }

    #[test]
    fn test_private_member_does_not_mask_unrecognized_export() {
        let base = Arc::new(
            Surface::new("ExtraBase")
                .export("MergeAccumulators", signature!(fn(MyAccum, MyAccum) -> MyAccum), handle())
                .export("ExtraMethod", signature!(fn(String) -> i32), handle()),
        );
        let surface = Surface::new("MaskedExtra")
            .delegate_to(base)
            .private("ExtraMethod", signature!(fn()), handle());
        assert_eq!(rules(&surface), vec![("ExtraMethod".to_string(), Rule::UnrecognizedMember)]);
    }

    #[test]
    fn test_every_violation_is_reported() {
        let surface = Surface::new("Everything")
            .export("ExtraPublic", signature!(fn(String) -> i32), handle())
            .export("MergeAccumulators", signature!(fn(i64, i64) -> i64), handle())
            .export("CreateAccumulator", signature!(fn() -> String), handle())
            .export("ExtractOutput", signature!(fn(i64, i64) -> i64), handle());

        assert_eq!(
            rules(&surface),
            vec![
                ("ExtraPublic".to_string(), Rule::UnrecognizedMember),
                ("CreateAccumulator".to_string(), Rule::TypeMismatch),
                ("ExtractOutput".to_string(), Rule::ArityMismatch),
            ]
        );
    }

    #[test]
    fn test_arity_still_checked_without_accumulator() {
        let surface = Surface::new("NoMergeBadCreate").export("CreateAccumulator", signature!(fn(String) -> String), handle());
        assert_eq!(
            rules(&surface),
            vec![
                ("MergeAccumulators".to_string(), Rule::MissingMandatoryOperation),
                ("CreateAccumulator".to_string(), Rule::ArityMismatch),
            ]
        );
    }
}
