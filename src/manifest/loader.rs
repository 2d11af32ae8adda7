//! Turning a manifest into candidates.

use crate::core::candidate::{Candidate, Form, Member, OperationHandle, Surface, Visibility};
use crate::core::error::{CombineResult, ManifestError};
use crate::core::operation::OperationKind;
use crate::core::signature::Signature;
use crate::core::types::{Context, Failure, TypeDescriptor};
use crate::manifest::schema::{CandidateSpec, Manifest};
use crate::validation::pipeline::ValidatorOptions;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Names a manifest may use for types, mapped to identities.
#[derive(Debug, Clone)]
pub struct TypeTable {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeTable {
    /// Table of the built-in type names.
    ///
    /// `context` and `failure` resolve to the well-known calling-convention
    /// types.
    pub fn with_builtins() -> Self {
        let mut types = HashMap::new();
        let mut add = |name: &str, ty: TypeDescriptor| {
            types.insert(name.to_string(), ty);
        };

        add("i8", TypeDescriptor::of::<i8>());
        add("i16", TypeDescriptor::of::<i16>());
        add("i32", TypeDescriptor::of::<i32>());
        add("i64", TypeDescriptor::of::<i64>());
        add("int", TypeDescriptor::of::<i64>());
        add("int64", TypeDescriptor::of::<i64>());
        add("isize", TypeDescriptor::of::<isize>());
        add("u8", TypeDescriptor::of::<u8>());
        add("u16", TypeDescriptor::of::<u16>());
        add("u32", TypeDescriptor::of::<u32>());
        add("u64", TypeDescriptor::of::<u64>());
        add("uint", TypeDescriptor::of::<u64>());
        add("usize", TypeDescriptor::of::<usize>());
        add("f32", TypeDescriptor::of::<f32>());
        add("f64", TypeDescriptor::of::<f64>());
        add("float", TypeDescriptor::of::<f64>());
        add("bool", TypeDescriptor::of::<bool>());
        add("char", TypeDescriptor::of::<char>());
        add("String", TypeDescriptor::of::<String>());
        add("string", TypeDescriptor::of::<String>());
        add("bytes", TypeDescriptor::of::<Vec<u8>>());
        add("context", TypeDescriptor::of::<Context>());
        add("failure", TypeDescriptor::of::<Failure>());

        Self { types }
    }

    /// Declare an opaque type.
    pub fn declare(&mut self, name: &str) -> Result<TypeDescriptor, ManifestError> {
        if self.types.contains_key(name) {
            return Err(ManifestError::DuplicateType(name.to_string()));
        }
        let ty = TypeDescriptor::declared(name);
        self.types.insert(name.to_string(), ty.clone());
        Ok(ty)
    }

    /// Look up a type name.
    pub fn resolve(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    fn resolve_all(&self, candidate: &str, names: &[String]) -> Result<Vec<TypeDescriptor>, ManifestError> {
        names
            .iter()
            .map(|name| {
                self.resolve(name).cloned().ok_or_else(|| ManifestError::UnknownType {
                    candidate: candidate.to_string(),
                    name: name.clone(),
                })
            })
            .collect()
    }

    fn signature(&self, candidate: &str, params: &[String], returns: &[String]) -> Result<Signature, ManifestError> {
        Ok(Signature::from_parts(
            self.resolve_all(candidate, params)?,
            self.resolve_all(candidate, returns)?,
        ))
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// The operation a manifest handle stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOperation {
    /// Candidate that declared the member.
    pub candidate: String,
    /// Member name.
    pub member: String,
}

/// A manifest turned into candidates.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    /// Validator options from the `[validator]` table.
    pub options: ValidatorOptions,
    /// Candidates in manifest order.
    pub candidates: Vec<Candidate>,
}

/// Read and build a manifest file.
pub fn load_manifest(path: &Path) -> CombineResult<LoadedManifest> {
    let contents = fs::read_to_string(path)?;
    let loaded = parse_manifest(&contents)?;
    log::debug!(
        "Loaded {} candidate(s) from {}",
        loaded.candidates.len(),
        path.display()
    );
    Ok(loaded)
}

/// Parse and build manifest text.
pub fn parse_manifest(contents: &str) -> Result<LoadedManifest, ManifestError> {
    let manifest = Manifest::from_toml(contents).map_err(|e| ManifestError::Parse(e.to_string()))?;
    build_manifest(&manifest)
}

/// Build candidates from a parsed manifest.
///
/// Embedded bases are built first and shared, so every candidate that
/// embeds the same base delegates to the same surface.
pub fn build_manifest(manifest: &Manifest) -> Result<LoadedManifest, ManifestError> {
    let mut table = TypeTable::with_builtins();
    for name in &manifest.types {
        table.declare(name)?;
    }

    let mut specs: IndexMap<&str, &CandidateSpec> = IndexMap::new();
    for spec in &manifest.candidates {
        check_spec_shape(spec)?;
        if specs.insert(spec.name.as_str(), spec).is_some() {
            return Err(ManifestError::DuplicateCandidate(spec.name.clone()));
        }
    }

    let mut built: HashMap<&str, Arc<Surface>> = HashMap::new();
    let mut candidates = Vec::with_capacity(specs.len());

    for spec in specs.values().copied() {
        let candidate = match spec.form {
            Form::Functional => {
                let signature = table.signature(&spec.name, &spec.params, &spec.returns)?;
                let handle = OperationHandle::new(ManifestOperation {
                    candidate: spec.name.clone(),
                    member: OperationKind::MergeAccumulators.name().to_string(),
                });
                Candidate::functional(&spec.name, signature, handle)
            }
            Form::Structural => {
                let mut visiting = Vec::new();
                let surface = build_surface(spec, &specs, &table, &mut built, &mut visiting)?;
                Candidate::structural(surface.as_ref().clone())
            }
        };
        candidates.push(candidate);
    }

    Ok(LoadedManifest {
        options: manifest.validator.clone(),
        candidates,
    })
}

fn check_spec_shape(spec: &CandidateSpec) -> Result<(), ManifestError> {
    match spec.form {
        Form::Functional if !spec.members.is_empty() || spec.embeds.is_some() => {
            Err(ManifestError::FunctionalWithMembers(spec.name.clone()))
        }
        Form::Structural if !spec.params.is_empty() || !spec.returns.is_empty() => {
            Err(ManifestError::StructuralWithSignature(spec.name.clone()))
        }
        _ => Ok(()),
    }
}

fn build_surface<'a>(
    spec: &'a CandidateSpec,
    specs: &IndexMap<&'a str, &'a CandidateSpec>,
    table: &TypeTable,
    built: &mut HashMap<&'a str, Arc<Surface>>,
    visiting: &mut Vec<&'a str>,
) -> Result<Arc<Surface>, ManifestError> {
    let name = spec.name.as_str();
    if let Some(surface) = built.get(name) {
        return Ok(surface.clone());
    }
    if let Some(pos) = visiting.iter().position(|v| *v == name) {
        let mut cycle: Vec<String> = visiting[pos..].iter().map(|v| v.to_string()).collect();
        cycle.push(name.to_string());
        return Err(ManifestError::EmbedCycle(cycle));
    }
    visiting.push(name);

    let mut surface = Surface::new(name);
    for member in &spec.members {
        if surface.own_members().any(|m| m.name == member.name) {
            return Err(ManifestError::DuplicateMember {
                candidate: name.to_string(),
                member: member.name.clone(),
            });
        }
        let visibility = if member.exported {
            Visibility::Exported
        } else {
            Visibility::Unexported
        };
        let handle = OperationHandle::new(ManifestOperation {
            candidate: name.to_string(),
            member: member.name.clone(),
        });
        let signature = table.signature(name, &member.params, &member.returns)?;
        surface.add_member(Member::new(&member.name, visibility, signature, handle));
    }

    if let Some(target) = &spec.embeds {
        let base_spec = specs
            .get(target.as_str())
            .copied()
            .ok_or_else(|| ManifestError::UnknownEmbed {
                candidate: name.to_string(),
                target: target.clone(),
            })?;
        if base_spec.form == Form::Functional {
            return Err(ManifestError::EmbedsFunctional {
                candidate: name.to_string(),
                target: target.clone(),
            });
        }
        let base = build_surface(base_spec, specs, table, built, visiting)?;
        surface = surface.delegate_to(base);
    }

    visiting.pop();
    let surface = Arc::new(surface);
    built.insert(name, surface.clone());
    Ok(surface)
}
