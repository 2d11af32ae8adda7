//! Candidates: the user-supplied values under validation.
//!
//! Nothing here is discovered by reflection. A user registers each
//! operation explicitly, pairing an opaque handle to the callable with the
//! signature it was declared with. Two shapes exist:
//!
//! - [`Candidate::Functional`]: a bare callable that is itself the merge
//! - [`Candidate::Structural`]: a [`Surface`] of named members, optionally
//!   delegating to a shared base surface for members it does not define

use crate::core::signature::Signature;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque shared reference to a user callable.
///
/// The validator never calls through it; downstream consumers recover the
/// concrete callable with [`OperationHandle::downcast_ref`].
#[derive(Clone)]
pub struct OperationHandle(Arc<dyn Any + Send + Sync>);

impl OperationHandle {
    /// Wrap a callable (or any value standing in for one).
    pub fn new<F: Any + Send + Sync>(target: F) -> Self {
        Self(Arc::new(target))
    }

    /// Recover the wrapped value.
    pub fn downcast_ref<F: Any>(&self) -> Option<&F> {
        self.0.downcast_ref::<F>()
    }

    /// Whether two handles share the same target.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperationHandle(<callable>)")
    }
}

/// Whether a member belongs to a surface's public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Inspected by the validator.
    Exported,
    /// Helper never inspected by the validator.
    Unexported,
}

/// One named operation on a surface.
#[derive(Debug, Clone)]
pub struct Member {
    /// Member name.
    pub name: String,
    /// Visibility to the validator.
    pub visibility: Visibility,
    /// Declared signature.
    pub signature: Signature,
    /// The callable behind the member.
    pub handle: OperationHandle,
}

impl Member {
    /// Create a member.
    pub fn new(
        name: impl Into<String>,
        visibility: Visibility,
        signature: Signature,
        handle: OperationHandle,
    ) -> Self {
        Self {
            name: name.into(),
            visibility,
            signature,
            handle,
        }
    }

    /// Whether the validator inspects this member.
    pub fn is_exported(&self) -> bool {
        self.visibility == Visibility::Exported
    }
}

/// A named-operation object.
///
/// Exported and unexported members live in separate namespaces. An
/// exported own member shadows an exported delegated member of the same
/// name; unexported members never shadow anything and are invisible to
/// validation. Delegated members that are not shadowed behave exactly like
/// own members.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    name: String,
    exported: IndexMap<String, Member>,
    unexported: IndexMap<String, Member>,
    delegate: Option<Arc<Surface>>,
}

impl Surface {
    /// Create an empty surface.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exported: IndexMap::new(),
            unexported: IndexMap::new(),
            delegate: None,
        }
    }

    /// Add an exported member.
    pub fn export(mut self, name: impl Into<String>, signature: Signature, handle: OperationHandle) -> Self {
        self.add_member(Member::new(name, Visibility::Exported, signature, handle));
        self
    }

    /// Add an unexported helper member.
    pub fn private(mut self, name: impl Into<String>, signature: Signature, handle: OperationHandle) -> Self {
        self.add_member(Member::new(name, Visibility::Unexported, signature, handle));
        self
    }

    /// Forward every exported member this surface does not define to `base`.
    pub fn delegate_to(mut self, base: Arc<Surface>) -> Self {
        self.delegate = Some(base);
        self
    }

    /// Add or replace a member within its visibility.
    pub fn add_member(&mut self, member: Member) {
        let members = match member.visibility {
            Visibility::Exported => &mut self.exported,
            Visibility::Unexported => &mut self.unexported,
        };
        members.insert(member.name.clone(), member);
    }

    /// Surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base surface, if any.
    pub fn delegate(&self) -> Option<&Arc<Surface>> {
        self.delegate.as_ref()
    }

    /// Members defined directly on this surface, exported ones first.
    pub fn own_members(&self) -> impl Iterator<Item = &Member> {
        self.exported.values().chain(self.unexported.values())
    }

    /// Resolve an exported member by name through the delegation chain.
    /// The shallowest exported definition wins.
    pub fn find_exported(&self, name: &str) -> Option<&Member> {
        self.exported
            .get(name)
            .or_else(|| self.delegate.as_deref().and_then(|base| base.find_exported(name)))
    }

    /// Every exported member visible on this surface: own members first,
    /// then unshadowed delegated ones, each in insertion order.
    pub fn exported_members(&self) -> Vec<&Member> {
        let mut visible: IndexMap<&str, &Member> = IndexMap::new();
        let mut layer = Some(self);

        while let Some(surface) = layer {
            for member in surface.exported.values() {
                visible.entry(member.name.as_str()).or_insert(member);
            }
            layer = surface.delegate.as_deref();
        }

        visible.into_values().collect()
    }
}

/// Which of the two candidate shapes a value has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Form {
    /// Bare binary merge callable.
    Functional,
    /// Named-operation surface.
    Structural,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Functional => f.write_str("functional"),
            Form::Structural => f.write_str("structural"),
        }
    }
}

/// A bare callable offered as a merge.
#[derive(Debug, Clone)]
pub struct FunctionalCandidate {
    /// Name used in diagnostics.
    pub name: String,
    /// Declared signature of the callable.
    pub signature: Signature,
    /// The callable.
    pub handle: OperationHandle,
}

/// The value under test.
#[derive(Debug, Clone)]
pub enum Candidate {
    /// A bare callable.
    Functional(FunctionalCandidate),
    /// A named-operation surface.
    Structural(Surface),
}

impl Candidate {
    /// Wrap a bare callable.
    pub fn functional(name: impl Into<String>, signature: Signature, handle: OperationHandle) -> Self {
        Candidate::Functional(FunctionalCandidate {
            name: name.into(),
            signature,
            handle,
        })
    }

    /// Wrap a surface.
    pub fn structural(surface: Surface) -> Self {
        Candidate::Structural(surface)
    }

    /// Candidate name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Candidate::Functional(f) => &f.name,
            Candidate::Structural(s) => s.name(),
        }
    }

    /// Shape of the candidate.
    pub fn form(&self) -> Form {
        match self {
            Candidate::Functional(_) => Form::Functional,
            Candidate::Structural(_) => Form::Structural,
        }
    }
}

impl From<Surface> for Candidate {
    fn from(surface: Surface) -> Self {
        Candidate::Structural(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature;

    fn handle() -> OperationHandle {
        OperationHandle::new(())
    }

    fn base() -> Arc<Surface> {
        Arc::new(
            Surface::new("base")
                .export("MergeAccumulators", signature!(fn(i64, i64) -> i64), handle())
                .private("helper", signature!(fn(String) -> String), handle()),
        )
    }

    #[test]
    fn test_handle_downcast() {
        let merge: fn(i64, i64) -> i64 = |a, b| a + b;
        let h = OperationHandle::new(merge);
        let f = h.downcast_ref::<fn(i64, i64) -> i64>().unwrap();
        assert_eq!(f(2, 3), 5);
        assert!(h.downcast_ref::<String>().is_none());
        assert!(h.ptr_eq(&h.clone()));
        assert!(!h.ptr_eq(&handle()));
    }

    #[test]
    fn test_delegated_members_are_visible() {
        let outer = Surface::new("outer")
            .export("CreateAccumulator", signature!(fn() -> i64), handle())
            .delegate_to(base());

        let names: Vec<_> = outer.exported_members().iter().map(|m| m.name.clone()).collect();
        assert_eq!(names, vec!["CreateAccumulator", "MergeAccumulators"]);
        assert!(outer.find_exported("MergeAccumulators").is_some());
        assert!(outer.find_exported("helper").is_none());
    }

    #[test]
    fn test_own_member_shadows_delegate() {
        let outer = Surface::new("outer")
            .export("MergeAccumulators", signature!(fn(i64, String) -> i64), handle())
            .delegate_to(base());

        let merge = outer.find_exported("MergeAccumulators").unwrap();
        assert_eq!(merge.signature, signature!(fn(i64, String) -> i64));
        assert_eq!(outer.exported_members().len(), 1);
    }

    #[test]
    fn test_private_member_never_shadows_exported_delegate() {
        let outer = Surface::new("outer")
            .private("MergeAccumulators", signature!(fn(String) -> String), handle())
            .delegate_to(base());

        let merge = outer.find_exported("MergeAccumulators").unwrap();
        assert_eq!(merge.signature, signature!(fn(i64, i64) -> i64));
        assert_eq!(outer.exported_members().len(), 1);
    }

    #[test]
    fn test_private_and_exported_namespaces_are_separate() {
        let surface = Surface::new("s")
            .export("AddInput", signature!(fn(i64, i64) -> i64), handle())
            .private("AddInput", signature!(fn(String) -> String), handle());

        assert_eq!(surface.own_members().count(), 2);
        let add = surface.find_exported("AddInput").unwrap();
        assert!(add.is_exported());
        assert_eq!(add.signature, signature!(fn(i64, i64) -> i64));
    }

    #[test]
    fn test_candidate_form_and_name() {
        let f = Candidate::functional("sum", signature!(fn(i64, i64) -> i64), handle());
        assert_eq!(f.form(), Form::Functional);
        assert_eq!(f.name(), "sum");

        let s: Candidate = Surface::new("mean").into();
        assert_eq!(s.form(), Form::Structural);
        assert_eq!(s.name(), "mean");
    }
}
