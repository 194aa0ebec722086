//! Summary types produced by the model calls, and the uniform error shape.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Structured repository summary returned by the synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RepoSummary {
    /// What the project does, 2-4 sentences, project name in bold.
    pub summary: String,
    /// Main languages, frameworks, libraries and tools.
    pub technologies: Vec<String>,
    /// How the project is organised, 1-3 sentences.
    pub structure: String,
}

impl RepoSummary {
    /// Canned summary for a repository that has no files at all.
    pub fn empty_repository(repo: &str) -> Self {
        Self {
            summary: format!("**{repo}** appears to be an empty repository with no files."),
            technologies: Vec::new(),
            structure: "No files found in the repository.".to_string(),
        }
    }
}

/// Unstructured-ish result of one extraction call over one chunk.
///
/// Every field is optional on the wire; models skip fields often enough
/// that a missing one must not sink the chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PartialAnalysis {
    /// What the code in the chunk does, 1-2 sentences.
    pub purpose: String,
    /// Technologies seen in the chunk.
    pub technologies: Vec<String>,
    /// Notable structural patterns, 1 sentence.
    pub structure_notes: String,
}

/// Category of a request-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed repository identifier; the caller must fix the input.
    InputError,
    /// Tree or content host unreachable, rate limited, or repository inaccessible.
    UpstreamUnavailable,
    /// The tree listing could not be scored.
    ScoringFailed,
    /// No file content could be fetched at all.
    AssemblyFailed,
    /// No partial analysis survived, or the synthesis call failed.
    SynthesisImpossible,
    /// The end-to-end deadline elapsed.
    Timeout,
}

impl ErrorKind {
    /// HTTP status a transport layer should map this kind to.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::InputError => 400,
            ErrorKind::UpstreamUnavailable => 502,
            ErrorKind::ScoringFailed => 422,
            ErrorKind::AssemblyFailed => 502,
            ErrorKind::SynthesisImpossible => 502,
            ErrorKind::Timeout => 504,
        }
    }
}

/// Two-field error shape every request-level failure is reported in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_requires_all_fields() {
        let missing = r#"{"summary": "x", "technologies": []}"#;
        assert!(serde_json::from_str::<RepoSummary>(missing).is_err());
    }

    #[test]
    fn partial_analysis_tolerates_missing_fields() {
        let partial: PartialAnalysis = serde_json::from_str(r#"{"purpose": "CLI"}"#).unwrap();
        assert_eq!(partial.purpose, "CLI");
        assert!(partial.technologies.is_empty());
    }

    #[test]
    fn error_response_serializes_kind_snake_case() {
        let resp = ErrorResponse {
            kind: ErrorKind::SynthesisImpossible,
            message: "nothing to reduce".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["kind"], "synthesis_impossible");
        assert_eq!(json["message"], "nothing to reduce");
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
    }

    #[test]
    fn empty_repository_summary_names_repo() {
        let s = RepoSummary::empty_repository("ghost");
        assert!(s.summary.starts_with("**ghost**"));
        assert!(s.technologies.is_empty());
    }
}
