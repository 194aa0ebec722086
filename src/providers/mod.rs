//! SummaryProvider trait and LLM integration.
//!
//! Provides an abstraction layer over rig-core to decouple the
//! pipeline from the specific LLM library. Response parsing and the
//! malformed-output retry live here so every backend shares them.

pub mod prompts;
pub mod rig;

use std::future::Future;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::models::{PartialAnalysis, RepoSummary};

/// Errors from the summary provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// LLM-backed summarization.
///
/// Implementations handle prompt building, model selection, and parsing.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Summarize a complete assembled context in one call.
    async fn summarize(&self, context: &str) -> Result<RepoSummary, ProviderError>;

    /// Extract a partial analysis from one chunk of file sections.
    async fn extract(&self, chunk: &str) -> Result<PartialAnalysis, ProviderError>;

    /// Merge partial analyses, in chunk order, into a final summary.
    async fn synthesize(
        &self,
        tree_and_readme: &str,
        partials: &[PartialAnalysis],
    ) -> Result<RepoSummary, ProviderError>;
}

/// Attempts per synthesis call: the original plus one corrective retry.
pub const MAX_PARSE_ATTEMPTS: usize = 2;

/// Maximum length of LLM response text to include in parse error messages.
const PARSE_ERROR_PREVIEW_LEN: usize = 2000;

/// Instruction appended when the previous reply was not valid JSON.
pub const CORRECTION_PROMPT: &str =
    "Your response was not valid JSON. Please return ONLY a valid JSON object, no markdown, no extra text.";

/// Prompt through `call`, re-prompting once with a correction if the
/// reply does not parse as `T`.
///
/// API errors are returned immediately; only malformed output is retried.
pub async fn prompt_with_parse_retry<T, F, Fut>(
    user_prompt: &str,
    mut call: F,
) -> Result<T, ProviderError>
where
    T: DeserializeOwned,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ProviderError>>,
{
    let mut prompt = user_prompt.to_string();
    let mut last_err = ProviderError::ParseError("no response".to_string());

    for attempt in 1..=MAX_PARSE_ATTEMPTS {
        let raw = call(prompt).await?;
        match parse_json_response::<T>(&raw) {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < MAX_PARSE_ATTEMPTS {
                    warn!("malformed LLM response (attempt {attempt}), retrying");
                }
                prompt = correction_prompt(user_prompt, &raw);
                last_err = e;
            }
        }
    }
    Err(last_err)
}

/// Original prompt, the rejected reply, and the correction instruction.
fn correction_prompt(user_prompt: &str, previous: &str) -> String {
    format!("{user_prompt}\n\n## Your previous response\n\n{previous}\n\n{CORRECTION_PROMPT}")
}

/// Parse an LLM reply as JSON of type `T`.
///
/// Tries the trimmed text, then the outermost `{...}` slice, then the
/// contents of any markdown code fences.
pub fn parse_json_response<T: DeserializeOwned>(response: &str) -> Result<T, ProviderError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::ParseError("empty response".to_string()));
    }

    let mut first_err = None;
    for candidate in extract_json_candidates(trimmed) {
        match serde_json::from_str::<T>(&candidate) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }

    let preview: String = response.chars().take(PARSE_ERROR_PREVIEW_LEN).collect();
    Err(ProviderError::ParseError(format!(
        "could not parse LLM response as JSON ({}). Response: {preview}",
        first_err.map_or_else(|| "no candidates".to_string(), |e| e.to_string())
    )))
}

/// Regex for extracting content inside markdown code fences.
///
/// The closing fence must start a line so backticks inside JSON string
/// values are not mistaken for it.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").expect("valid regex"));

fn extract_json_candidates(text: &str) -> Vec<String> {
    let mut candidates = vec![text.to_string()];

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            candidates.push(text[start..=end].to_string());
        }
    }

    for cap in FENCE_RE.captures_iter(text) {
        if let Some(inner) = cap.get(1) {
            let inner = inner.as_str().trim();
            if !inner.is_empty() {
                candidates.push(inner.to_string());
            }
        }
    }

    candidates
}
