//! Error types for combinefn.
//!
//! Uses thiserror for structured errors with context. Validation problems
//! are never raised one at a time: every violated rule becomes a
//! [`Diagnostic`], and a candidate's diagnostics travel together in one
//! [`ValidationFailure`].

use crate::core::descriptor::{CombineDescriptor, DescriptorSummary};
use crate::validation::diagnostics;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Top-level error type for combinefn.
#[derive(Error, Debug)]
pub enum CombineError {
    /// A candidate failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationFailure),

    /// A manifest could not be loaded.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Reading a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding of a report failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// Rules and diagnostics
// ============================================================================

/// The rule taxonomy. Every [`Diagnostic`] violates exactly one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// No `MergeAccumulators` operation was found.
    MissingMandatoryOperation,
    /// A bare callable is not `fn(T, T) -> T`.
    NonBinaryMerge,
    /// A type slot disagrees with the type it must equal.
    TypeMismatch,
    /// Wrong parameter or return count.
    ArityMismatch,
    /// An exported member outside the four recognized names.
    UnrecognizedMember,
}

impl Rule {
    /// All rules, in documentation order.
    pub const ALL: [Rule; 5] = [
        Rule::MissingMandatoryOperation,
        Rule::NonBinaryMerge,
        Rule::TypeMismatch,
        Rule::ArityMismatch,
        Rule::UnrecognizedMember,
    ];

    /// Short description of the rule.
    pub fn description(&self) -> &'static str {
        match self {
            Rule::MissingMandatoryOperation => "missing mandatory merge operation",
            Rule::NonBinaryMerge => "merge must be binary over one type",
            Rule::TypeMismatch => "type mismatch",
            Rule::ArityMismatch => "arity mismatch",
            Rule::UnrecognizedMember => "unrecognized exported member",
        }
    }

    /// Generic advice for fixing a violation of this rule.
    pub fn advice(&self) -> &'static str {
        match self {
            Rule::MissingMandatoryOperation => {
                "Export MergeAccumulators(A, A) -> A, directly or through a delegated base"
            }
            Rule::NonBinaryMerge => "Declare the callable as fn(T, T) -> T for a single type T",
            Rule::TypeMismatch => "Use the accumulator type established by MergeAccumulators in every accumulator slot",
            Rule::ArityMismatch => {
                "Match the operation's expected shape; only a leading Context and a trailing Failure may be added"
            }
            Rule::UnrecognizedMember => "Make the member unexported or remove it",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Where a type slot sits in a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "side", content = "index", rename_all = "lowercase")]
pub enum Slot {
    /// Semantic parameter at this index.
    Parameter(usize),
    /// Semantic return at this index.
    Return(usize),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Parameter(i) => write!(f, "parameter {}", i),
            Slot::Return(i) => write!(f, "return {}", i),
        }
    }
}

/// Which side of a signature an arity rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Semantic parameters.
    Parameters,
    /// Semantic returns.
    Returns,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Parameters => f.write_str("parameters"),
            Side::Returns => f.write_str("returns"),
        }
    }
}

/// One violated rule on one operation.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Diagnostic {
    /// `MergeAccumulators` is not exported, directly or by delegation.
    #[error("{operation}: missing mandatory merge operation")]
    MissingMandatoryOperation {
        /// Always `MergeAccumulators`.
        operation: String,
    },

    /// A bare callable is not `fn(T, T) -> T`.
    #[error("{operation}: merge must be binary over one type: expected fn(T, T) -> T, got {actual}")]
    NonBinaryMerge {
        /// Always `MergeAccumulators`.
        operation: String,
        /// Normalized shape of the callable.
        actual: String,
    },

    /// A type slot disagrees with the type it must equal.
    #[error("{operation}: type mismatch in {slot}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Offending operation.
        operation: String,
        /// Position of the slot in the normalized signature.
        slot: Slot,
        /// Required type name.
        expected: String,
        /// Declared type name.
        actual: String,
    },

    /// Wrong number of parameters or returns.
    #[error("{operation}: arity mismatch in {side}: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Offending operation.
        operation: String,
        /// Parameters or returns.
        side: Side,
        /// Required count, excluding context and failure.
        expected: usize,
        /// Declared count, excluding context and failure.
        actual: usize,
    },

    /// An exported member outside the four recognized names.
    #[error("{operation}: unrecognized exported member with shape {actual}")]
    UnrecognizedMember {
        /// Member name.
        operation: String,
        /// Declared signature of the member.
        actual: String,
    },
}

impl Diagnostic {
    /// Name of the operation the diagnostic is about.
    pub fn operation(&self) -> &str {
        match self {
            Diagnostic::MissingMandatoryOperation { operation }
            | Diagnostic::NonBinaryMerge { operation, .. }
            | Diagnostic::TypeMismatch { operation, .. }
            | Diagnostic::ArityMismatch { operation, .. }
            | Diagnostic::UnrecognizedMember { operation, .. } => operation,
        }
    }

    /// The violated rule.
    pub fn rule(&self) -> Rule {
        match self {
            Diagnostic::MissingMandatoryOperation { .. } => Rule::MissingMandatoryOperation,
            Diagnostic::NonBinaryMerge { .. } => Rule::NonBinaryMerge,
            Diagnostic::TypeMismatch { .. } => Rule::TypeMismatch,
            Diagnostic::ArityMismatch { .. } => Rule::ArityMismatch,
            Diagnostic::UnrecognizedMember { .. } => Rule::UnrecognizedMember,
        }
    }

    /// What the rule expected.
    pub fn expected(&self) -> String {
        match self {
            Diagnostic::MissingMandatoryOperation { .. } => "fn(A, A) -> A".to_string(),
            Diagnostic::NonBinaryMerge { .. } => "fn(T, T) -> T".to_string(),
            Diagnostic::TypeMismatch { expected, .. } => expected.clone(),
            Diagnostic::ArityMismatch { expected, .. } => expected.to_string(),
            Diagnostic::UnrecognizedMember { .. } => "no other exported members".to_string(),
        }
    }

    /// What was actually found.
    pub fn actual(&self) -> String {
        match self {
            Diagnostic::MissingMandatoryOperation { .. } => "nothing".to_string(),
            Diagnostic::NonBinaryMerge { actual, .. }
            | Diagnostic::TypeMismatch { actual, .. }
            | Diagnostic::UnrecognizedMember { actual, .. } => actual.clone(),
            Diagnostic::ArityMismatch { actual, .. } => actual.to_string(),
        }
    }

    /// Get suggestion for fixing this diagnostic.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            Diagnostic::MissingMandatoryOperation { .. } => Some(Rule::MissingMandatoryOperation.advice().to_string()),
            Diagnostic::NonBinaryMerge { .. } => Some(Rule::NonBinaryMerge.advice().to_string()),
            Diagnostic::TypeMismatch { operation, slot, expected, .. } => {
                Some(format!("Change {} of {} to {}", slot, operation, expected))
            }
            Diagnostic::ArityMismatch { operation, side, expected, .. } => Some(format!(
                "Give {} exactly {} {} besides Context/Failure",
                operation, expected, side
            )),
            Diagnostic::UnrecognizedMember { operation, .. } => {
                Some(format!("Make '{}' unexported or remove it", operation))
            }
        }
    }
}

/// Every rule a candidate violated, in discovery order.
///
/// Never partial: a candidate either yields a descriptor or one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Name of the candidate.
    pub candidate: String,
    /// Violations in discovery order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationFailure {
    /// Whether any diagnostic violates `rule`.
    pub fn has_rule(&self, rule: Rule) -> bool {
        self.diagnostics.iter().any(|d| d.rule() == rule)
    }

    /// Diagnostics about one operation.
    pub fn for_operation<'a>(&'a self, operation: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.operation() == operation)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&diagnostics::render(&self.candidate, &self.diagnostics))
    }
}

impl std::error::Error for ValidationFailure {}

/// Errors from loading candidate manifests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    /// TOML syntax or schema error.
    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    /// A signature names a type that is neither built in nor declared.
    #[error("Unknown type '{name}' in candidate '{candidate}'")]
    UnknownType {
        /// Candidate using the type.
        candidate: String,
        /// The unknown type name.
        name: String,
    },

    /// A declared type repeats another declaration or a built-in name.
    #[error("Type '{0}' is declared twice or shadows a built-in type")]
    DuplicateType(String),

    /// Two candidates share a name.
    #[error("Candidate '{0}' is defined more than once")]
    DuplicateCandidate(String),

    /// Two members of one candidate share a name.
    #[error("Member '{member}' is defined more than once in candidate '{candidate}'")]
    DuplicateMember {
        /// Candidate declaring the members.
        candidate: String,
        /// Repeated member name.
        member: String,
    },

    /// `embeds` names no candidate.
    #[error("Candidate '{candidate}' embeds unknown candidate '{target}'")]
    UnknownEmbed {
        /// Embedding candidate.
        candidate: String,
        /// Missing target.
        target: String,
    },

    /// `embeds` names a functional candidate.
    #[error("Candidate '{candidate}' embeds functional candidate '{target}'")]
    EmbedsFunctional {
        /// Embedding candidate.
        candidate: String,
        /// Functional target.
        target: String,
    },

    /// Candidates embed each other in a loop; the path ends where it began.
    #[error("Embedding cycle through candidates: {0:?}")]
    EmbedCycle(Vec<String>),

    /// A functional candidate declares members or `embeds`.
    #[error("Functional candidate '{0}' cannot declare members or embed another candidate")]
    FunctionalWithMembers(String),

    /// A structural candidate declares `params` or `returns`.
    #[error("Structural candidate '{0}' declares its shape through members, not params/returns")]
    StructuralWithSignature(String),
}

/// Result type alias for combinefn operations.
pub type CombineResult<T> = Result<T, CombineError>;

/// Result type alias for validating one candidate.
pub type ValidationResult = Result<CombineDescriptor, ValidationFailure>;

// ============================================================================
// Validation Report
// ============================================================================

/// Verdict for one candidate in a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CandidateOutcome {
    /// The candidate produced a descriptor.
    Valid {
        /// Summary of the descriptor.
        descriptor: DescriptorSummary,
    },
    /// The candidate failed validation.
    Invalid {
        /// All diagnostics.
        failure: ValidationFailure,
    },
}

/// Report over a batch of candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether every candidate validated.
    pub success: bool,
    /// One outcome per candidate, in input order.
    pub outcomes: Vec<CandidateOutcome>,
    /// Time taken for validation in milliseconds.
    pub duration_ms: u64,
}

impl ValidationReport {
    /// Create a new empty report (success).
    pub fn new() -> Self {
        Self {
            success: true,
            outcomes: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Record one candidate's verdict.
    pub fn record(&mut self, result: &ValidationResult) {
        let outcome = match result {
            Ok(descriptor) => CandidateOutcome::Valid {
                descriptor: descriptor.summary(),
            },
            Err(failure) => {
                self.success = false;
                CandidateOutcome::Invalid {
                    failure: failure.clone(),
                }
            }
        };
        self.outcomes.push(outcome);
    }

    /// Number of valid candidates.
    pub fn valid_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CandidateOutcome::Valid { .. }))
            .count()
    }

    /// Number of invalid candidates.
    pub fn invalid_count(&self) -> usize {
        self.outcomes.len() - self.valid_count()
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.success {
            format!("✓ All {} candidate(s) are valid combine operations", self.outcomes.len())
        } else {
            format!(
                "✗ {} of {} candidate(s) failed validation",
                self.invalid_count(),
                self.outcomes.len()
            )
        }
    }

    /// Rendered diagnostics of every failed candidate.
    pub fn detailed_errors(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                CandidateOutcome::Invalid { failure } => Some(failure.to_string()),
                CandidateOutcome::Valid { .. } => None,
            })
            .collect()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
