//! Map-reduce fallback for contexts over budget.
//!
//! Every chunk is extracted concurrently and independently; a failed
//! chunk is logged and dropped. Surviving partials are reduced once, in
//! chunk order.

use std::sync::Arc;

use indexmap::IndexMap;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::context::TokenEstimator;
use crate::models::{PartialAnalysis, RepoSummary};
use crate::providers::SummaryProvider;
use crate::providers::rig::classify_error;

use super::PipelineError;
use super::chunker::chunk_files;

/// Result of a completed map-reduce run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapReduceOutcome {
    pub summary: RepoSummary,
    pub chunks: usize,
    pub succeeded: usize,
}

/// Chunk `files`, extract each chunk, and synthesize the survivors.
///
/// Fails with [`PipelineError::SynthesisImpossible`] without calling the
/// reduce step when no chunk succeeds.
pub async fn map_reduce(
    files: &IndexMap<String, String>,
    tree_and_readme: &str,
    chunk_tokens: usize,
    estimator: TokenEstimator,
    provider: Arc<dyn SummaryProvider>,
) -> Result<MapReduceOutcome, PipelineError> {
    let chunks = chunk_files(files, chunk_tokens, estimator);
    let total = chunks.len();
    info!("map step: {total} chunks of at most {chunk_tokens} tokens");

    let mut join_set = JoinSet::new();
    for chunk in chunks {
        let provider = Arc::clone(&provider);
        join_set.spawn(async move {
            let result = provider.extract(&chunk.text()).await;
            (chunk.index, result)
        });
    }

    let mut slots: Vec<Option<PartialAnalysis>> = vec![None; total];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, Ok(partial))) => slots[index] = Some(partial),
            Ok((index, Err(e))) => {
                let reason = classify_error(&e).unwrap_or("extraction failed");
                warn!("chunk {} failed ({reason}): {e}", index + 1);
            }
            Err(e) => warn!("chunk task failed: {e}"),
        }
    }

    let partials: Vec<PartialAnalysis> = slots.into_iter().flatten().collect();
    let succeeded = partials.len();
    info!("map step complete: {succeeded}/{total} chunks succeeded");

    if partials.is_empty() {
        return Err(PipelineError::SynthesisImpossible(format!(
            "all {total} extraction calls failed; nothing to synthesize"
        )));
    }

    let summary = provider
        .synthesize(tree_and_readme, &partials)
        .await
        .map_err(|e| PipelineError::SynthesisImpossible(format!("synthesis call failed: {e}")))?;

    Ok(MapReduceOutcome {
        summary,
        chunks: total,
        succeeded,
    })
}
