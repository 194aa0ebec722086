//! Terminal renderer: styled flowing text.

use colored::Colorize;

use crate::models::{ErrorResponse, RankedFileList, RepoId};
use crate::orchestrator::{SummaryOutcome, SummaryPath};
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, outcome: &SummaryOutcome) -> String {
        let summary = &outcome.summary;
        let mut output = String::new();

        output.push_str(&format!(" {}\n\n", outcome.repo.to_string().bold()));
        output.push_str(&format!(" {}\n\n", summary.summary));

        if !summary.technologies.is_empty() {
            output.push_str(&format!(" {}\n", "Technologies".cyan().bold()));
            for tech in &summary.technologies {
                output.push_str(&format!("   {} {tech}\n", "•".cyan()));
            }
            output.push('\n');
        }

        output.push_str(&format!(" {}\n", "Structure".cyan().bold()));
        output.push_str(&format!("   {}\n\n", summary.structure));

        let path = match outcome.path {
            SummaryPath::EmptyRepository => "empty repository".to_string(),
            SummaryPath::Direct => format!("single call, ~{} tokens", outcome.context_tokens),
            SummaryPath::MapReduce { chunks, succeeded } => {
                format!("map-reduce, {succeeded}/{chunks} chunks")
            }
        };
        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        output.push_str(&format!(
            " {} files ranked · {path} · {:.1?}\n",
            outcome.ranked_files.to_string().bold(),
            outcome.elapsed
        ));

        output
    }

    fn render_error(&self, error: &ErrorResponse) -> String {
        format!(
            " {} {} {}\n",
            "✖".red().bold(),
            error.kind.as_ref().red().bold(),
            error.message
        )
    }

    fn render_ranked(&self, repo: &RepoId, ranked: &RankedFileList) -> String {
        if ranked.is_empty() {
            return format!(" {} no informative files in {repo}\n", "ℹ".blue().bold());
        }

        let mut output = format!(" {}\n\n", repo.to_string().bold());
        for file in ranked {
            output.push_str(&format!(
                "  {:>3}  {:<11} {}\n",
                file.score.to_string().bold(),
                file.tier.as_ref().dimmed(),
                file.path()
            ));
        }
        output
    }
}
