//! Recognized combine operations and their normalized shape.

use crate::core::signature::write_shape;
use crate::core::types::TypeDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four operations a combine candidate may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// `MergeAccumulators(A, A) -> A`, mandatory.
    MergeAccumulators,
    /// `CreateAccumulator() -> A`
    CreateAccumulator,
    /// `AddInput(A, I) -> A`
    AddInput,
    /// `ExtractOutput(A) -> O`
    ExtractOutput,
}

impl OperationKind {
    /// All recognized operations, in validation order.
    pub const ALL: [OperationKind; 4] = [
        OperationKind::MergeAccumulators,
        OperationKind::CreateAccumulator,
        OperationKind::AddInput,
        OperationKind::ExtractOutput,
    ];

    /// Exported member name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::MergeAccumulators => "MergeAccumulators",
            OperationKind::CreateAccumulator => "CreateAccumulator",
            OperationKind::AddInput => "AddInput",
            OperationKind::ExtractOutput => "ExtractOutput",
        }
    }

    /// Look up an operation by its exact member name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Whether a candidate must provide this operation.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, OperationKind::MergeAccumulators)
    }

    /// Expected semantic shape, for diagnostics and help output.
    pub fn expected_shape(&self) -> &'static str {
        match self {
            OperationKind::MergeAccumulators => "fn(A, A) -> A",
            OperationKind::CreateAccumulator => "fn() -> A",
            OperationKind::AddInput => "fn(A, I) -> A",
            OperationKind::ExtractOutput => "fn(A) -> O",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation's semantic shape after calling-convention normalization.
///
/// `params` and `returns` exclude the context parameter and the failure
/// return; their presence is recorded in the two flags instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Member name the operation was found under.
    pub name: String,
    /// Semantic parameter types.
    pub params: Vec<TypeDescriptor>,
    /// Semantic return types.
    pub returns: Vec<TypeDescriptor>,
    /// Leading context parameter was present.
    pub accepts_context: bool,
    /// Trailing failure return was present.
    pub returns_failure: bool,
}

impl Operation {
    /// The operation's semantic shape, e.g. `fn(A, i64) -> A`.
    pub fn shape(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_shape(&mut out, &self.params, &self.returns);
        out
    }

    /// The recognized operation kind, if the name is one.
    pub fn kind(&self) -> Option<OperationKind> {
        OperationKind::from_name(&self.name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.shape())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(OperationKind::from_name("mergeAccumulators"), None);
        assert_eq!(OperationKind::from_name("Setup"), None);
    }

    #[test]
    fn test_only_merge_is_mandatory() {
        let mandatory: Vec<_> = OperationKind::ALL.into_iter().filter(|k| k.is_mandatory()).collect();
        assert_eq!(mandatory, vec![OperationKind::MergeAccumulators]);
    }

    #[test]
    fn test_shape_rendering() {
        let op = Operation {
            name: "AddInput".to_string(),
            params: vec![TypeDescriptor::declared("Accum"), TypeDescriptor::of::<i64>()],
            returns: vec![TypeDescriptor::declared("Accum")],
            accepts_context: true,
            returns_failure: false,
        };
        assert_eq!(op.shape(), "fn(Accum, i64) -> Accum");
        assert_eq!(op.kind(), Some(OperationKind::AddInput));
        assert_eq!(op.to_string(), "AddInput fn(Accum, i64) -> Accum");
    }
}
