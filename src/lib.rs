//! # combinefn - Combine-function validation
//!
//! combinefn checks whether a user-supplied candidate can act as a
//! *combine function*: an aggregation that folds many inputs into an
//! accumulator, merges accumulators produced in parallel, and extracts a
//! final output. A candidate that passes is turned into a
//! [`CombineDescriptor`](core::descriptor::CombineDescriptor) naming its
//! accumulator, input and output types and its bound operations. A
//! candidate that fails yields every rule it breaks at once.
//!
//! ## Candidate forms
//!
//! - **Functional**: a single callable `merge(A, A) -> A`.
//! - **Structural**: a [`Surface`](core::candidate::Surface) with the
//!   mandatory `MergeAccumulators` member and optional
//!   `CreateAccumulator`, `AddInput` and `ExtractOutput` members.
//!
//! Every operation may take a leading [`Context`](core::types::Context) and
//! may return a trailing [`Failure`](core::types::Failure) after its value.
//!
//! ## Quick Start
//!
//! ```rust
//! use combinefn::prelude::*;
//!
//! fn sum(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! let candidate = Candidate::functional(
//!     "sum",
//!     signature!(fn(i64, i64) -> i64),
//!     OperationHandle::new(sum as fn(i64, i64) -> i64),
//! );
//!
//! let descriptor = validate(&candidate).unwrap();
//! assert_eq!(descriptor.accumulator_type(), &TypeDescriptor::of::<i64>());
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: type identities, signatures, candidates, descriptors and errors
//! - [`validation`]: the inspector and the functional and structural matchers
//! - [`manifest`]: TOML manifests describing candidates without Rust code

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod manifest;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use combinefn::prelude::*;
/// ```
pub mod prelude {
    // Types and signatures
    pub use crate::core::signature::Signature;
    pub use crate::core::types::{Context, Failure, TypeDescriptor};
    pub use crate::signature;

    // Candidates
    pub use crate::core::candidate::{Candidate, Form, Member, OperationHandle, Surface, Visibility};
    pub use crate::core::operation::{Operation, OperationKind};

    // Results
    pub use crate::core::descriptor::{BoundOperation, CombineDescriptor, DescriptorSummary};
    pub use crate::core::error::{
        CombineError, CombineResult, Diagnostic, ManifestError, Rule, ValidationFailure,
        ValidationReport, ValidationResult,
    };

    // Validation
    pub use crate::validation::pipeline::{validate, Validator, ValidatorOptions};

    // Manifests
    pub use crate::manifest::loader::{load_manifest, parse_manifest, LoadedManifest};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
