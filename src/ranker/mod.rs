//! File informativeness scoring and ranking.
//!
//! Pure functions over a tree snapshot: no I/O, deterministic, idempotent.
//! The rule set itself lives in [`rules`].

pub mod rules;

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::config::LimitsConfig;
use crate::models::{FileDescriptor, FileKind, RankedFileList, ScoredFile, Tier};

pub use rules::Exclusion;
use rules::{PathInfo, RULES};

/// Malformed tree input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    #[error("tree entry with an empty path")]
    EmptyPath,

    #[error("duplicate path in tree: {0}")]
    DuplicatePath(String),
}

/// Ceilings applied during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankLimits {
    pub max_file_size: u64,
    pub max_tree_depth: usize,
}

impl Default for RankLimits {
    fn default() -> Self {
        LimitsConfig::default().into()
    }
}

impl From<&LimitsConfig> for RankLimits {
    fn from(limits: &LimitsConfig) -> Self {
        Self {
            max_file_size: limits.max_file_size,
            max_tree_depth: limits.max_tree_depth,
        }
    }
}

impl From<LimitsConfig> for RankLimits {
    fn from(limits: LimitsConfig) -> Self {
        (&limits).into()
    }
}

/// Score a single file. `None` means excluded (score 0).
pub fn classify(path: &str, size_bytes: u64, limits: &RankLimits) -> Option<(u8, Tier)> {
    let info = PathInfo::new(path);
    if exclude(&info, size_bytes, limits).is_some() {
        return None;
    }
    match_rule(&info, size_bytes)
}

/// The hard exclusion that drops `path` before scoring, if any.
pub fn exclusion_reason(path: &str, size_bytes: u64, limits: &RankLimits) -> Option<Exclusion> {
    exclude(&PathInfo::new(path), size_bytes, limits)
}

fn exclude(info: &PathInfo, size_bytes: u64, limits: &RankLimits) -> Option<Exclusion> {
    rules::exclusion(info, size_bytes, limits.max_file_size, limits.max_tree_depth)
}

fn match_rule(info: &PathInfo, size_bytes: u64) -> Option<(u8, Tier)> {
    RULES
        .iter()
        .find(|rule| rule.matches(info))
        .map(|rule| (rule.score.evaluate(info, size_bytes), rule.tier))
        .filter(|(score, _)| *score > 0)
}

/// Informativeness score 0..=100 for a single file; 0 means excluded.
pub fn score(path: &str, size_bytes: u64, limits: &RankLimits) -> u8 {
    classify(path, size_bytes, limits).map_or(0, |(score, _)| score)
}

/// Score, filter, and sort a tree.
///
/// Directory entries are never scored. Output is sorted by score
/// descending, then path length ascending; the sort is stable so equal
/// keys keep tree order.
pub fn rank(tree: &[FileDescriptor], limits: &RankLimits) -> Result<RankedFileList, RankError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(tree.len());
    let mut scored: Vec<ScoredFile> = Vec::new();

    for entry in tree {
        if entry.path.is_empty() {
            return Err(RankError::EmptyPath);
        }
        if !seen.insert(entry.path.as_str()) {
            return Err(RankError::DuplicatePath(entry.path.clone()));
        }
        if entry.kind != FileKind::File {
            continue;
        }

        let info = PathInfo::new(&entry.path);
        if let Some(reason) = exclude(&info, entry.size_bytes, limits) {
            debug!("score   0 {} (excluded: {reason})", entry.path);
            continue;
        }
        let classified = match_rule(&info, entry.size_bytes);
        debug!(
            "score {:3} {}",
            classified.map_or(0, |(s, _)| s),
            entry.path
        );
        if let Some((score, tier)) = classified {
            scored.push(ScoredFile {
                file: entry.clone(),
                score,
                tier,
            });
        }
    }

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.file.path.len().cmp(&b.file.path.len()))
    });

    Ok(RankedFileList::from_sorted(scored))
}
