//! Candidate manifests.
//!
//! A manifest describes candidates in TOML so they can be validated without
//! writing Rust: opaque types are declared by name, functional candidates
//! list their parameter and return types, and structural candidates list
//! their members and may embed another structural candidate.

pub mod loader;
pub mod schema;

pub use loader::{build_manifest, load_manifest, parse_manifest, LoadedManifest, ManifestOperation, TypeTable};
pub use schema::{CandidateSpec, Manifest, MemberSpec};
