//! The validated combine descriptor handed to the pipeline graph builder.

use crate::core::candidate::{Form, OperationHandle};
use crate::core::operation::{Operation, OperationKind};
use crate::core::types::TypeDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a validated descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DescriptorId(pub Uuid);

impl DescriptorId {
    /// Create a new random descriptor ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DescriptorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// A validated operation together with the callable it came from.
#[derive(Debug, Clone)]
pub struct BoundOperation {
    operation: Operation,
    handle: OperationHandle,
}

impl BoundOperation {
    pub(crate) fn new(operation: Operation, handle: OperationHandle) -> Self {
        Self { operation, handle }
    }

    /// Normalized operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// The user's callable.
    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    /// Whether the callable expects a leading context.
    pub fn accepts_context(&self) -> bool {
        self.operation.accepts_context
    }

    /// Whether the callable returns a trailing failure.
    pub fn returns_failure(&self) -> bool {
        self.operation.returns_failure
    }
}

/// A fully validated combine operation.
///
/// Every accumulator-typed slot of every present operation equals
/// `accumulator`, which is taken from the merge operation. Immutable once
/// built.
#[derive(Debug, Clone)]
pub struct CombineDescriptor {
    id: DescriptorId,
    name: String,
    form: Form,
    accumulator: TypeDescriptor,
    input: TypeDescriptor,
    output: TypeDescriptor,
    merge: BoundOperation,
    create: Option<BoundOperation>,
    add_input: Option<BoundOperation>,
    extract_output: Option<BoundOperation>,
}

/// Validated structural operations, before assembly.
pub(crate) struct StructuralParts {
    /// Type established by the merge.
    pub(crate) accumulator: TypeDescriptor,
    /// `AddInput`'s second parameter, or the accumulator.
    pub(crate) input: TypeDescriptor,
    /// `ExtractOutput`'s return, or the accumulator.
    pub(crate) output: TypeDescriptor,
    pub(crate) merge: BoundOperation,
    pub(crate) create: Option<BoundOperation>,
    pub(crate) add_input: Option<BoundOperation>,
    pub(crate) extract_output: Option<BoundOperation>,
}

impl CombineDescriptor {
    /// Descriptor of a bare merge callable over `accumulator`.
    pub(crate) fn functional(name: impl Into<String>, accumulator: TypeDescriptor, merge: BoundOperation) -> Self {
        Self {
            id: DescriptorId::new(),
            name: name.into(),
            form: Form::Functional,
            input: accumulator.clone(),
            output: accumulator.clone(),
            accumulator,
            merge,
            create: None,
            add_input: None,
            extract_output: None,
        }
    }

    /// Descriptor of a named-operation surface.
    pub(crate) fn structural(name: impl Into<String>, parts: StructuralParts) -> Self {
        Self {
            id: DescriptorId::new(),
            name: name.into(),
            form: Form::Structural,
            accumulator: parts.accumulator,
            input: parts.input,
            output: parts.output,
            merge: parts.merge,
            create: parts.create,
            add_input: parts.add_input,
            extract_output: parts.extract_output,
        }
    }

    /// Descriptor ID.
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    /// Candidate name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape of the candidate this descriptor was built from.
    pub fn form(&self) -> Form {
        self.form
    }

    /// Accumulator type.
    pub fn accumulator_type(&self) -> &TypeDescriptor {
        &self.accumulator
    }

    /// Input element type.
    pub fn input_type(&self) -> &TypeDescriptor {
        &self.input
    }

    /// Output type.
    pub fn output_type(&self) -> &TypeDescriptor {
        &self.output
    }

    /// The merge operation.
    pub fn merge(&self) -> &BoundOperation {
        &self.merge
    }

    /// The accumulator constructor, if provided.
    pub fn create_accumulator(&self) -> Option<&BoundOperation> {
        self.create.as_ref()
    }

    /// The input folding operation, if provided.
    pub fn add_input(&self) -> Option<&BoundOperation> {
        self.add_input.as_ref()
    }

    /// The output extraction operation, if provided.
    pub fn extract_output(&self) -> Option<&BoundOperation> {
        self.extract_output.as_ref()
    }

    /// Look up a present operation by kind.
    pub fn operation(&self, kind: OperationKind) -> Option<&BoundOperation> {
        match kind {
            OperationKind::MergeAccumulators => Some(&self.merge),
            OperationKind::CreateAccumulator => self.create.as_ref(),
            OperationKind::AddInput => self.add_input.as_ref(),
            OperationKind::ExtractOutput => self.extract_output.as_ref(),
        }
    }

    /// Present operations, in canonical order.
    pub fn operations(&self) -> impl Iterator<Item = (OperationKind, &BoundOperation)> {
        OperationKind::ALL
            .into_iter()
            .filter_map(move |kind| self.operation(kind).map(|op| (kind, op)))
    }

    /// Serializable summary for reports.
    pub fn summary(&self) -> DescriptorSummary {
        DescriptorSummary {
            id: self.id,
            name: self.name.clone(),
            form: self.form,
            accumulator: self.accumulator.name().to_string(),
            input: self.input.name().to_string(),
            output: self.output.name().to_string(),
            operations: self
                .operations()
                .map(|(kind, op)| OperationSummary {
                    kind,
                    shape: op.operation().shape(),
                    accepts_context: op.accepts_context(),
                    returns_failure: op.returns_failure(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for CombineDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} -> [{}] -> {}",
            self.name, self.form, self.input, self.accumulator, self.output
        )
    }
}

/// Serializable view of one bound operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSummary {
    /// Which operation.
    pub kind: OperationKind,
    /// Semantic shape.
    pub shape: String,
    /// Leading context parameter present.
    pub accepts_context: bool,
    /// Trailing failure return present.
    pub returns_failure: bool,
}

/// Serializable view of a descriptor. Carries type names only, so it is a
/// report format and not a transport format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorSummary {
    /// Descriptor ID.
    pub id: DescriptorId,
    /// Candidate name.
    pub name: String,
    /// Candidate shape.
    pub form: Form,
    /// Accumulator type name.
    pub accumulator: String,
    /// Input type name.
    pub input: String,
    /// Output type name.
    pub output: String,
    /// Present operations.
    pub operations: Vec<OperationSummary>,
}

impl DescriptorSummary {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(name: &str, params: Vec<TypeDescriptor>, returns: Vec<TypeDescriptor>) -> BoundOperation {
        BoundOperation::new(
            Operation {
                name: name.to_string(),
                params,
                returns,
                accepts_context: false,
                returns_failure: true,
            },
            OperationHandle::new(()),
        )
    }

    #[test]
    fn test_descriptor_id_display() {
        let id = DescriptorId::new();
        assert_eq!(format!("{}", id).len(), 8);
    }

    #[test]
    fn test_functional_descriptor_types() {
        let t = TypeDescriptor::of::<i64>();
        let merge = bound("MergeAccumulators", vec![t.clone(), t.clone()], vec![t.clone()]);
        let desc = CombineDescriptor::functional("sum", t.clone(), merge);

        assert_eq!(desc.accumulator_type(), &t);
        assert_eq!(desc.input_type(), &t);
        assert_eq!(desc.output_type(), &t);
        assert!(desc.create_accumulator().is_none());
        assert_eq!(desc.operations().count(), 1);
        assert_eq!(desc.to_string(), "sum (functional): i64 -> [i64] -> i64");
    }

    #[test]
    fn test_summary_json() {
        let t = TypeDescriptor::declared("Accum");
        let merge = bound("MergeAccumulators", vec![t.clone(), t.clone()], vec![t.clone()]);
        let desc = CombineDescriptor::functional("accum", t, merge);

        let json = desc.summary().to_json().unwrap();
        assert!(json.contains("\"accumulator\": \"Accum\""));
        assert!(json.contains("MergeAccumulators"));
        assert!(json.contains("\"returns_failure\": true"));
    }
}
