//! On-disk manifest format.

use crate::core::candidate::Form;
use crate::validation::pipeline::ValidatorOptions;
use serde::{Deserialize, Serialize};

/// A manifest of candidates to validate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Opaque type names used by the candidates.
    #[serde(default)]
    pub types: Vec<String>,
    /// Validator options.
    #[serde(default)]
    pub validator: ValidatorOptions,
    /// Candidates, in validation order.
    #[serde(default, rename = "candidate")]
    pub candidates: Vec<CandidateSpec>,
}

/// One candidate entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateSpec {
    /// Unique candidate name.
    pub name: String,
    /// Candidate shape.
    pub form: Form,
    /// Parameter type names (functional form only).
    #[serde(default)]
    pub params: Vec<String>,
    /// Return type names (functional form only).
    #[serde(default)]
    pub returns: Vec<String>,
    /// Structural candidate whose members this one delegates to.
    #[serde(default)]
    pub embeds: Option<String>,
    /// Members (structural form only).
    #[serde(default, rename = "member")]
    pub members: Vec<MemberSpec>,
}

/// One member of a structural candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSpec {
    /// Member name.
    pub name: String,
    /// Whether the validator sees the member.
    #[serde(default = "default_exported")]
    pub exported: bool,
    /// Parameter type names.
    #[serde(default)]
    pub params: Vec<String>,
    /// Return type names.
    #[serde(default)]
    pub returns: Vec<String>,
}

fn default_exported() -> bool {
    true
}

impl Manifest {
    /// Parse from TOML.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let manifest = Manifest::from_toml(
            r#"
            [[candidate]]
            name = "mean"
            form = "structural"

              [[candidate.member]]
              name = "helper"
              exported = false

              [[candidate.member]]
              name = "MergeAccumulators"
              params = ["i64", "i64"]
              returns = ["i64"]
            "#,
        )
        .unwrap();

        assert!(manifest.types.is_empty());
        assert_eq!(manifest.validator, ValidatorOptions::default());
        let candidate = &manifest.candidates[0];
        assert_eq!(candidate.form, Form::Structural);
        assert!(!candidate.members[0].exported);
        assert!(candidate.members[1].exported);
        assert!(candidate.members[0].params.is_empty());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = Manifest::from_toml(
            r#"
            [[candidate]]
            name = "sum"
            form = "functional"
            parameters = ["i64"]
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_unknown_form() {
        assert!(Manifest::from_toml("[[candidate]]\nname = \"x\"\nform = \"curried\"\n").is_err());
    }
}
