//! Greedy chunking of fetched files for the map step.
//!
//! Files are never split: one that is larger than the ceiling by itself
//! becomes a chunk of its own.

use indexmap::IndexMap;

use crate::context::{TokenEstimator, format_file_section};
use crate::models::Chunk;

/// Group files into chunks of at most `max_tokens`, preserving order.
///
/// Returns an empty vec when there are no files.
pub fn chunk_files(
    files: &IndexMap<String, String>,
    max_tokens: usize,
    estimator: TokenEstimator,
) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut current: Vec<(String, String)> = Vec::new();
    let mut current_chars = 0;

    for (path, content) in files {
        let section_chars = format_file_section(path, content).chars().count();

        if estimator.estimate_chars(current_chars + section_chars) > max_tokens
            && !current.is_empty()
        {
            chunks.push(Chunk {
                index: chunks.len(),
                files: std::mem::take(&mut current),
                estimated_tokens: estimator.estimate_chars(current_chars),
            });
            current_chars = 0;
        }

        current.push((path.clone(), content.clone()));
        current_chars += section_chars;
    }

    if !current.is_empty() {
        chunks.push(Chunk {
            index: chunks.len(),
            files: current,
            estimated_tokens: estimator.estimate_chars(current_chars),
        });
    }

    chunks
}
