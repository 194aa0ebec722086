//! Context assembly.
//!
//! Fetches ranked file contents and packs them into a single
//! [`ContextBlob`] under a token budget. The tree listing, READMEs, and
//! manifests are always included; every other file is added in rank order
//! until the next one would push the total over the budget.

pub mod listing;
pub mod tokens;

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::github::{ContentProvider, FileContent, GithubError};
use crate::models::{ContextBlob, FileDescriptor, RankedFileList, RepoId, ScoredFile, Tier};

pub use listing::{tree_and_readme, tree_listing};
pub use tokens::{needs_fallback, TokenEstimator};

/// Render one file as a labelled context section.
pub fn format_file_section(path: &str, content: &str) -> String {
    format!("## File: {path}\n{content}\n\n")
}

/// Result of fetching the top of a ranked list.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Non-empty text contents keyed by path, in rank order.
    pub contents: IndexMap<String, String>,
    pub attempted: usize,
    pub failed: usize,
    pub binary: usize,
}

impl FetchReport {
    /// Every attempted fetch failed outright.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failed == self.attempted
    }
}

/// Fetch the first `max_files` ranked files concurrently.
///
/// Individual failures are logged and skipped. Results keep rank order
/// regardless of completion order.
pub async fn fetch_ranked(
    repo: &RepoId,
    ranked: &RankedFileList,
    source: Arc<dyn ContentProvider>,
    max_files: usize,
    concurrency: usize,
) -> FetchReport {
    let targets: Vec<String> = ranked
        .iter()
        .take(max_files)
        .map(|f| f.path().to_string())
        .collect();
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set = JoinSet::new();

    for (index, path) in targets.iter().enumerate() {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let repo = repo.clone();
        let path = path.clone();
        join_set.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => source.content(&repo, &path).await,
                Err(_) => Err(GithubError::Api("fetch cancelled".to_string())),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<FileContent, GithubError>>> = vec![None; targets.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!("fetch task failed: {e}"),
        }
    }

    let mut report = FetchReport {
        attempted: targets.len(),
        ..FetchReport::default()
    };
    for (path, slot) in targets.into_iter().zip(slots) {
        match slot {
            Some(Ok(FileContent::Text(text))) if !text.is_empty() => {
                report.contents.insert(path, text);
            }
            Some(Ok(FileContent::Text(_))) => debug!("skipping empty file {path}"),
            Some(Ok(FileContent::Binary)) => {
                debug!("skipping binary file {path}");
                report.binary += 1;
            }
            Some(Err(e)) => {
                warn!("failed to fetch {path}: {e}");
                report.failed += 1;
            }
            None => report.failed += 1,
        }
    }
    report
}

/// Pack fetched contents into a budgeted blob.
///
/// The tree listing, README sections, and manifest sections are always
/// present even if they alone exceed the budget; the caller detects that
/// with [`needs_fallback`]. Remaining files are appended in rank order
/// while the running total plus the next file stays within the budget,
/// and inclusion stops at the first file that does not fit.
pub fn compose(
    tree: &[FileDescriptor],
    ranked: &RankedFileList,
    fetched: &IndexMap<String, String>,
    budget_tokens: usize,
    estimator: TokenEstimator,
) -> ContextBlob {
    let mut text = tree_listing(tree);
    text.push('\n');
    let mut chars = text.chars().count();
    let mut included: Vec<String> = Vec::new();

    for tier in [Tier::Readme, Tier::Manifest] {
        for (file, content) in with_content(ranked, fetched).filter(|(f, _)| f.tier == tier) {
            let section = format_file_section(file.path(), content);
            chars += section.chars().count();
            text.push_str(&section);
            included.push(file.path().to_string());
        }
    }

    let mut omitted: Vec<String> = Vec::new();
    let mut full = false;
    let rest = with_content(ranked, fetched)
        .filter(|(f, _)| !matches!(f.tier, Tier::Readme | Tier::Manifest));
    for (file, content) in rest {
        if full {
            omitted.push(file.path().to_string());
            continue;
        }
        let section = format_file_section(file.path(), content);
        let section_chars = section.chars().count();
        if estimator.estimate_chars(chars + section_chars) > budget_tokens {
            debug!("budget reached at {}", file.path());
            full = true;
            omitted.push(file.path().to_string());
            continue;
        }
        chars += section_chars;
        text.push_str(&section);
        included.push(file.path().to_string());
    }

    ContextBlob {
        estimated_tokens: estimator.estimate_chars(chars),
        text,
        included,
        omitted,
    }
}

/// Ranked files that have fetched content, in rank order.
fn with_content<'a>(
    ranked: &'a RankedFileList,
    fetched: &'a IndexMap<String, String>,
) -> impl Iterator<Item = (&'a ScoredFile, &'a String)> + 'a {
    ranked
        .iter()
        .filter_map(move |f| fetched.get(f.path()).map(|c| (f, c)))
}

/// Fetch and compose in one step.
#[allow(clippy::too_many_arguments)]
pub async fn assemble(
    repo: &RepoId,
    tree: &[FileDescriptor],
    ranked: &RankedFileList,
    source: Arc<dyn ContentProvider>,
    max_files: usize,
    concurrency: usize,
    budget_tokens: usize,
    estimator: TokenEstimator,
) -> (ContextBlob, FetchReport) {
    let report = fetch_ranked(repo, ranked, source, max_files, concurrency).await;
    let blob = compose(tree, ranked, &report.contents, budget_tokens, estimator);
    (blob, report)
}
