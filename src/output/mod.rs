//! Output renderers: terminal and JSON.

pub mod json;
pub mod terminal;

use crate::models::{ErrorResponse, RankedFileList, RepoId};
use crate::orchestrator::SummaryOutcome;

/// Trait for rendering pipeline results to an output format.
pub trait OutputRenderer {
    /// Render a successful summary.
    fn render(&self, outcome: &SummaryOutcome) -> String;

    /// Render a request-level failure.
    fn render_error(&self, error: &ErrorResponse) -> String;

    /// Render a ranked file list for `reposum rank`.
    fn render_ranked(&self, repo: &RepoId, ranked: &RankedFileList) -> String;
}
