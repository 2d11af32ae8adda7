//! Validation of combine candidates.
//!
//! [`validate`] is the entry point: it branches on the candidate's form,
//! normalizes each operation through the [`inspector`], applies the form's
//! shape rules, and aggregates violations into [`Diagnostics`].

pub mod diagnostics;
pub mod functional;
pub mod inspector;
pub mod pipeline;
pub mod structural;

pub use diagnostics::Diagnostics;
pub use functional::validate_functional;
pub use inspector::{inspect, normalize, OperationSource};
pub use pipeline::{validate, Validator, ValidatorOptions};
pub use structural::validate_structural;
