//! Core types for combine validation.
//!
//! This module contains the foundational types:
//! - Type identities and the well-known context/failure types
//! - Signatures and the registration API for candidates
//! - The validated descriptor
//! - Error and diagnostic types

pub mod types;
pub mod signature;
pub mod operation;
pub mod candidate;
pub mod descriptor;
pub mod error;

// Re-export commonly used types
pub use types::{Context, Failure, TypeDescriptor, TypeKey};
pub use signature::Signature;
pub use operation::{Operation, OperationKind};
pub use candidate::{Candidate, Form, FunctionalCandidate, Member, OperationHandle, Surface, Visibility};
pub use descriptor::{BoundOperation, CombineDescriptor, DescriptorId, DescriptorSummary};
pub use error::{CombineError, Diagnostic, ManifestError, Rule, ValidationFailure, ValidationReport};
