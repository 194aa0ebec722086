//! Repository tree types: raw descriptors and their ranked form.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Whether a tree entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
}

/// One entry of a repository tree snapshot. Identity is `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Slash-separated path relative to the repository root.
    pub path: String,
    pub kind: FileKind,
    pub size_bytes: u64,
}

impl FileDescriptor {
    pub fn file(path: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::File,
            size_bytes,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::Dir,
            size_bytes: 0,
        }
    }
}

/// The scoring tier a file was classified into.
///
/// Declaration order is rule precedence: the first matching tier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Readme,
    Manifest,
    Header,
    Infra,
    AppConfig,
    EntryPoint,
    Docs,
    Test,
    LintConfig,
    Source,
}

/// A file descriptor with its informativeness score (1..=100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredFile {
    #[serde(flatten)]
    pub file: FileDescriptor,
    pub score: u8,
    pub tier: Tier,
}

impl ScoredFile {
    pub fn path(&self) -> &str {
        &self.file.path
    }
}

/// Scored files with exclusions removed, sorted by score descending then
/// path length ascending. Downstream consumers never re-sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedFileList(Vec<ScoredFile>);

impl RankedFileList {
    /// Wrap an already-sorted list. Only the ranker constructs these.
    pub(crate) fn from_sorted(files: Vec<ScoredFile>) -> Self {
        Self(files)
    }

    pub fn files(&self) -> &[ScoredFile] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredFile> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.0.iter().map(ScoredFile::path).collect()
    }

    /// The first `n` entries as `path (score)`, comma separated.
    pub fn describe_top(&self, n: usize) -> String {
        self.0
            .iter()
            .take(n)
            .map(|f| format!("{} ({})", f.path(), f.score))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Keep only the top `n` entries. Order is unchanged.
    pub fn truncate(&mut self, n: usize) {
        self.0.truncate(n);
    }
}

impl<'a> IntoIterator for &'a RankedFileList {
    type Item = &'a ScoredFile;
    type IntoIter = std::slice::Iter<'a, ScoredFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(path: &str, score: u8) -> ScoredFile {
        ScoredFile {
            file: FileDescriptor::file(path, 1),
            score,
            tier: Tier::Source,
        }
    }

    #[test]
    fn describe_top_lists_leading_entries_with_scores() {
        let list = RankedFileList::from_sorted(vec![
            scored("README.md", 100),
            scored("Cargo.toml", 90),
            scored("src/main.rs", 70),
        ]);
        assert_eq!(list.describe_top(2), "README.md (100), Cargo.toml (90)");
        assert_eq!(list.describe_top(10), "README.md (100), Cargo.toml (90), src/main.rs (70)");
        assert_eq!(RankedFileList::default().describe_top(3), "");
    }
}
