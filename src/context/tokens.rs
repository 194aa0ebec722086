//! Token estimation and the budget gate.
//!
//! The estimate is a character count divided by a fixed ratio, not a
//! tokenizer. It over-counts for typical source text, so contexts err on
//! the side of under-filling.

use crate::models::ContextBlob;

/// Characters-per-token estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEstimator {
    chars_per_token: usize,
}

impl TokenEstimator {
    /// A ratio of zero is treated as one.
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// Estimated tokens for `text`.
    pub fn estimate(&self, text: &str) -> usize {
        self.estimate_chars(text.chars().count())
    }

    /// Estimated tokens for a character count.
    pub fn estimate_chars(&self, chars: usize) -> usize {
        chars / self.chars_per_token
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new(3)
    }
}

/// True iff the assembled context is over budget and the map-reduce
/// path must be taken.
pub fn needs_fallback(blob: &ContextBlob, budget_tokens: usize) -> bool {
    blob.estimated_tokens > budget_tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_divides_chars() {
        let est = TokenEstimator::default();
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("ab"), 0);
        assert_eq!(est.estimate("abcdef"), 2);
        assert_eq!(est.estimate("abcdefg"), 2);
    }

    #[test]
    fn estimate_counts_chars_not_bytes() {
        let est = TokenEstimator::new(1);
        assert_eq!(est.estimate("héllo"), 5);
    }

    #[test]
    fn zero_ratio_is_clamped() {
        assert_eq!(TokenEstimator::new(0).estimate("abc"), 3);
    }

    #[test]
    fn gate_is_strict_threshold() {
        let blob = |tokens| ContextBlob {
            estimated_tokens: tokens,
            ..ContextBlob::default()
        };
        assert!(needs_fallback(&blob(120_000), 100_000));
        assert!(needs_fallback(&blob(100_001), 100_000));
        assert!(!needs_fallback(&blob(100_000), 100_000));
        assert!(!needs_fallback(&blob(0), 100_000));
    }
}
