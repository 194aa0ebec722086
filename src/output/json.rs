//! JSON output renderer.
//!
//! A summary renders as `{"summary", "technologies", "structure"}`; a
//! failure renders as `{"kind", "message"}`.

use crate::models::{ErrorResponse, RankedFileList, RepoId};
use crate::orchestrator::SummaryOutcome;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, outcome: &SummaryOutcome) -> String {
        serde_json::to_string_pretty(&outcome.summary).unwrap_or_else(|_| "{}".to_string())
    }

    fn render_error(&self, error: &ErrorResponse) -> String {
        serde_json::to_string_pretty(error).unwrap_or_else(|_| "{}".to_string())
    }

    fn render_ranked(&self, repo: &RepoId, ranked: &RankedFileList) -> String {
        let output = serde_json::json!({
            "repository": repo.to_string(),
            "files": ranked,
        });
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
