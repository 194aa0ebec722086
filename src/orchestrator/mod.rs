//! Summary pipeline: ranking, assembly, the budget gate, and synthesis.
//!
//! One request runs tree listing → ranking → fetch and assembly → either
//! a single direct call or the map-reduce fallback, all under one
//! end-to-end deadline.

pub mod chunker;
pub mod map_reduce;

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::LimitsConfig;
use crate::context::{self, TokenEstimator, needs_fallback, tree_and_readme};
use crate::github::{ContentProvider, GithubError, TreeProvider, parse_repo_url};
use crate::models::{ErrorKind, ErrorResponse, FileKind, RepoId, RepoSummary};
use crate::providers::SummaryProvider;
use crate::ranker::{self, RankError, RankLimits};

pub use map_reduce::{MapReduceOutcome, map_reduce};

/// How many of the highest-ranked files are named in the ranking log line.
const TOP_FILES_LOGGED: usize = 5;

/// Request-level failures. Every variant maps to one [`ErrorKind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("{0}")]
    Input(String),

    #[error("{0}")]
    UpstreamUnavailable(String),

    #[error("failed to score repository tree: {0}")]
    ScoringFailed(#[from] RankError),

    #[error("could not fetch any file content: {0}")]
    AssemblyFailed(String),

    #[error("{0}")]
    SynthesisImpossible(String),

    #[error("request did not finish within {0} seconds")]
    Timeout(u64),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Input(_) => ErrorKind::InputError,
            PipelineError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            PipelineError::ScoringFailed(_) => ErrorKind::ScoringFailed,
            PipelineError::AssemblyFailed(_) => ErrorKind::AssemblyFailed,
            PipelineError::SynthesisImpossible(_) => ErrorKind::SynthesisImpossible,
            PipelineError::Timeout(_) => ErrorKind::Timeout,
        }
    }

    /// The uniform `{kind, message}` shape.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<GithubError> for PipelineError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::InvalidUrl(_) => PipelineError::Input(err.to_string()),
            other => PipelineError::UpstreamUnavailable(other.to_string()),
        }
    }
}

/// Which synthesis path produced the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryPath {
    /// The repository has no files; no model call was made.
    EmptyRepository,
    /// The assembled context fit the budget and was summarized in one call.
    Direct,
    MapReduce { chunks: usize, succeeded: usize },
}

/// A successful pipeline run.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub repo: RepoId,
    pub summary: RepoSummary,
    pub path: SummaryPath,
    /// Files with a nonzero score.
    pub ranked_files: usize,
    /// Estimated tokens of the assembled context.
    pub context_tokens: usize,
    pub elapsed: Duration,
}

/// End-to-end summarization of one repository.
pub struct SummaryPipeline {
    tree: Arc<dyn TreeProvider>,
    content: Arc<dyn ContentProvider>,
    provider: Arc<dyn SummaryProvider>,
    limits: LimitsConfig,
    deadline: Duration,
}

impl SummaryPipeline {
    pub fn new(
        tree: Arc<dyn TreeProvider>,
        content: Arc<dyn ContentProvider>,
        provider: Arc<dyn SummaryProvider>,
        limits: LimitsConfig,
        deadline: Duration,
    ) -> Self {
        Self {
            tree,
            content,
            provider,
            limits,
            deadline,
        }
    }

    /// Parse a repository URL and summarize it.
    pub async fn summarize_url(&self, url: &str) -> Result<SummaryOutcome, PipelineError> {
        let repo = parse_repo_url(url)?;
        self.run(&repo).await
    }

    /// Summarize `repo`, failing with [`PipelineError::Timeout`] once the
    /// deadline elapses. In-flight work is cancelled on timeout.
    pub async fn run(&self, repo: &RepoId) -> Result<SummaryOutcome, PipelineError> {
        let started = Instant::now();
        let span = info_span!("request", id = %Uuid::new_v4());
        let stages = self.run_stages(repo, started).instrument(span);
        match tokio::time::timeout(self.deadline, stages).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{repo}: deadline of {:?} exceeded", self.deadline);
                Err(PipelineError::Timeout(self.deadline.as_secs()))
            }
        }
    }

    async fn run_stages(
        &self,
        repo: &RepoId,
        started: Instant,
    ) -> Result<SummaryOutcome, PipelineError> {
        let estimator = TokenEstimator::new(self.limits.chars_per_token);

        let tree = self.tree.tree(repo).await?;
        let file_count = tree.files.iter().filter(|f| f.kind == FileKind::File).count();
        info!("{repo}: {file_count} files in tree");

        if file_count == 0 {
            return Ok(SummaryOutcome {
                repo: repo.clone(),
                summary: RepoSummary::empty_repository(&repo.repo),
                path: SummaryPath::EmptyRepository,
                ranked_files: 0,
                context_tokens: 0,
                elapsed: started.elapsed(),
            });
        }

        let ranked = ranker::rank(&tree.files, &RankLimits::from(&self.limits))?;
        info!(
            "{repo}: {} files ranked, top: {}",
            ranked.len(),
            ranked.describe_top(TOP_FILES_LOGGED)
        );

        let (blob, report) = context::assemble(
            repo,
            &tree.files,
            &ranked,
            Arc::clone(&self.content),
            self.limits.max_files,
            self.limits.fetch_concurrency,
            self.limits.token_budget,
            estimator,
        )
        .await;
        if report.all_failed() {
            return Err(PipelineError::AssemblyFailed(format!(
                "all {} fetches for {repo} failed",
                report.attempted
            )));
        }
        info!(
            "{repo}: context ~{} tokens, {} files included, {} omitted",
            blob.estimated_tokens,
            blob.included.len(),
            blob.omitted.len()
        );

        let (summary, path) = if needs_fallback(&blob, self.limits.token_budget) {
            debug!("{repo}: over budget, using map-reduce");
            let block = tree_and_readme(&tree.files, &ranked, &report.contents);
            let outcome = map_reduce(
                &report.contents,
                &block,
                self.limits.chunk_tokens,
                estimator,
                Arc::clone(&self.provider),
            )
            .await?;
            (
                outcome.summary,
                SummaryPath::MapReduce {
                    chunks: outcome.chunks,
                    succeeded: outcome.succeeded,
                },
            )
        } else {
            debug!("{repo}: within budget, using a single call");
            let summary = self.provider.summarize(&blob.text).await.map_err(|e| {
                PipelineError::SynthesisImpossible(format!("summary call failed: {e}"))
            })?;
            (summary, SummaryPath::Direct)
        };

        let elapsed = started.elapsed();
        info!("{repo}: summarized via {path:?} in {elapsed:.2?}");
        Ok(SummaryOutcome {
            repo: repo.clone(),
            summary,
            path,
            ranked_files: ranked.len(),
            context_tokens: blob.estimated_tokens,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_maps_to_its_kind() {
        let cases = [
            (PipelineError::Input("bad".into()), ErrorKind::InputError),
            (
                PipelineError::UpstreamUnavailable("down".into()),
                ErrorKind::UpstreamUnavailable,
            ),
            (
                PipelineError::ScoringFailed(RankError::EmptyPath),
                ErrorKind::ScoringFailed,
            ),
            (PipelineError::AssemblyFailed("x".into()), ErrorKind::AssemblyFailed),
            (
                PipelineError::SynthesisImpossible("x".into()),
                ErrorKind::SynthesisImpossible,
            ),
            (PipelineError::Timeout(120), ErrorKind::Timeout),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind);
            assert_eq!(err.to_response().kind, kind);
            assert!(!err.to_response().message.is_empty());
        }
    }

    #[test]
    fn github_errors_map_to_input_or_upstream() {
        let invalid: PipelineError = GithubError::InvalidUrl("x".into()).into();
        assert_eq!(invalid.kind(), ErrorKind::InputError);

        for err in [
            GithubError::NotFound("o/r".into()),
            GithubError::RateLimited,
            GithubError::AccessDenied("o/r".into()),
            GithubError::Network("reset".into()),
        ] {
            let mapped: PipelineError = err.into();
            assert_eq!(mapped.kind(), ErrorKind::UpstreamUnavailable);
        }
    }

    #[test]
    fn rate_limit_message_mentions_token() {
        let mapped: PipelineError = GithubError::RateLimited.into();
        assert!(mapped.to_response().message.contains("GITHUB_TOKEN"));
    }
}
