//! Assembled-context types.

use serde::Serialize;

/// Model-ready context: the tree listing plus labelled file sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextBlob {
    pub text: String,
    /// Estimate of `text` under the configured chars-per-token ratio.
    pub estimated_tokens: usize,
    /// Paths whose content made it into `text`, in inclusion order.
    pub included: Vec<String>,
    /// Fetched paths left out once the budget was reached.
    pub omitted: Vec<String>,
}

/// A group of whole files sent to one extraction call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the chunk sequence; reduce input follows this order.
    pub index: usize,
    /// `(path, content)` pairs in ranked order.
    pub files: Vec<(String, String)>,
    pub estimated_tokens: usize,
}

impl Chunk {
    /// Render the chunk as consecutive `## File:` sections.
    pub fn text(&self) -> String {
        self.files
            .iter()
            .map(|(path, content)| crate::context::format_file_section(path, content))
            .collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(p, _)| p.as_str())
    }
}
