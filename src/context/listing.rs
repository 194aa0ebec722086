//! Directory-tree listing and the tree + README block used by the reduce step.

use indexmap::IndexMap;

use crate::models::{FileDescriptor, RankedFileList, Tier};

use super::format_file_section;

/// Header line of the tree listing section.
pub const TREE_HEADER: &str = "## Repository Directory Tree";

/// Render every tree entry, one per line, indented two spaces per level.
pub fn tree_listing(tree: &[FileDescriptor]) -> String {
    let mut out = String::from(TREE_HEADER);
    out.push_str("\n\n");
    for entry in tree {
        let depth = entry.path.matches('/').count();
        let name = entry.path.rsplit('/').next().unwrap_or(&entry.path);
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// Tree listing followed by the highest-ranked README that has content.
pub fn tree_and_readme(
    tree: &[FileDescriptor],
    ranked: &RankedFileList,
    fetched: &IndexMap<String, String>,
) -> String {
    let mut out = tree_listing(tree);
    out.push('\n');
    let readme = ranked
        .iter()
        .filter(|f| f.tier == Tier::Readme)
        .find_map(|f| fetched.get(f.path()).map(|c| (f.path(), c)));
    if let Some((path, content)) = readme {
        out.push_str(&format_file_section(path, content));
    }
    out
}
