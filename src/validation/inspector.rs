//! Signature inspection and calling-convention normalization.
//!
//! Every operation, whichever form it comes from, is looked up through
//! [`inspect`] and goes through [`normalize`] before any shape rule runs,
//! so accepting a context and returning a failure never change what an
//! operation's shape must be.

use crate::core::candidate::{Candidate, FunctionalCandidate, OperationHandle, Surface};
use crate::core::descriptor::BoundOperation;
use crate::core::operation::{Operation, OperationKind};
use crate::core::signature::Signature;

/// Anything exposing named operations to the inspector.
pub trait OperationSource {
    /// Declared signature and callable of the named operation, if it is
    /// exposed.
    fn lookup(&self, name: &str) -> Option<(&Signature, &OperationHandle)>;
}

/// A bare callable is its own `MergeAccumulators` and has no other
/// operations.
impl OperationSource for FunctionalCandidate {
    fn lookup(&self, name: &str) -> Option<(&Signature, &OperationHandle)> {
        (name == OperationKind::MergeAccumulators.name()).then_some((&self.signature, &self.handle))
    }
}

/// Exported members only, own members first and then the delegation chain.
impl OperationSource for Surface {
    fn lookup(&self, name: &str) -> Option<(&Signature, &OperationHandle)> {
        self.find_exported(name).map(|member| (&member.signature, &member.handle))
    }
}

impl OperationSource for Candidate {
    fn lookup(&self, name: &str) -> Option<(&Signature, &OperationHandle)> {
        match self {
            Candidate::Functional(f) => f.lookup(name),
            Candidate::Structural(s) => s.lookup(name),
        }
    }
}

/// Find a named operation on a candidate and normalize it.
///
/// `None` means the operation was not found.
pub fn inspect<S: OperationSource + ?Sized>(source: &S, name: &str) -> Option<Operation> {
    source.lookup(name).map(|(signature, _)| normalize(name, signature))
}

/// Strip a leading context parameter and a trailing failure return.
///
/// Both are recognized by type identity only. A context anywhere but
/// first, or a failure anywhere but last, stays in the semantic signature.
pub fn normalize(name: &str, signature: &Signature) -> Operation {
    let mut params = signature.params();
    let mut returns = signature.returns_list();

    let accepts_context = matches!(params.first(), Some(ty) if ty.is_context());
    if accepts_context {
        params = &params[1..];
    }

    let returns_failure = matches!(returns.last(), Some(ty) if ty.is_failure());
    if returns_failure {
        returns = &returns[..returns.len() - 1];
    }

    Operation {
        name: name.to_string(),
        params: params.to_vec(),
        returns: returns.to_vec(),
        accepts_context,
        returns_failure,
    }
}

/// Inspect a named operation and pair it with its callable.
pub(crate) fn bind<S: OperationSource + ?Sized>(source: &S, name: &str) -> Option<BoundOperation> {
    let operation = inspect(source, name)?;
    let (_, handle) = source.lookup(name)?;
    log::trace!("inspected {}", operation);
    Some(BoundOperation::new(operation, handle.clone()))
}
