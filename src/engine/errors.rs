//! Structured failures from the patch engine.
//!
//! Every failure is a tagged variant with its payload so callers (the
//! fallback applier, the CLI) branch on kind instead of parsing messages.

use crate::engine::nearmiss::NearMiss;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApplyError {
    /// A block matched nowhere, at any tolerance level. Carries the closest
    /// approximate region as a suggestion when one exists.
    #[error("block {block_index} matched nowhere in the content{}", near_miss_hint(.near_miss))]
    NoMatch {
        block_index: usize,
        near_miss: Option<NearMiss>,
    },

    /// Two or more equally cheap complete plans exist; the named block is
    /// the first whose chosen location diverges between them.
    #[error(
        "block {block_index} is ambiguous: equally good matches at lines {}",
        format_lines(.locations)
    )]
    AmbiguousMatch {
        block_index: usize,
        /// 1-based line numbers of the divergent candidate locations.
        locations: Vec<usize>,
    },

    /// The cheapest complete plan is still too loose to trust.
    #[error("best match score {score} exceeds the configured maximum {max_score}")]
    ScoreThresholdExceeded { score: u64, max_score: u64 },

    /// Branch exploration hit the hard resource cap before completing.
    #[error("plan exploration exceeded the limit of {limit} branches")]
    BranchLimitExceeded { limit: usize },
}

impl ApplyError {
    /// Whether the batch pass should retry blocks individually.
    ///
    /// Threshold and resource failures are fatal: a too-costly match is
    /// treated as no match, and a branch blowup will not shrink per block.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            ApplyError::NoMatch { .. } | ApplyError::AmbiguousMatch { .. }
        )
    }

    /// Index of the block the error is attributed to, when it is per-block.
    pub fn block_index(&self) -> Option<usize> {
        match self {
            ApplyError::NoMatch { block_index, .. }
            | ApplyError::AmbiguousMatch { block_index, .. } => Some(*block_index),
            _ => None,
        }
    }
}

fn near_miss_hint(near_miss: &Option<NearMiss>) -> String {
    match near_miss {
        Some(miss) => format!(
            "; closest region (similarity {:.2}) starts at line {}:\n{}",
            miss.similarity, miss.start_line, miss.region
        ),
        None => String::new(),
    }
}

fn format_lines(locations: &[usize]) -> String {
    let rendered: Vec<String> = locations.iter().map(ToString::to_string).collect();
    rendered.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_message_names_block_and_lines() {
        let err = ApplyError::AmbiguousMatch {
            block_index: 0,
            locations: vec![1, 2],
        };
        let message = err.to_string();
        assert!(message.contains("block 0"));
        assert!(message.contains("lines 1, 2"));
    }

    #[test]
    fn no_match_message_includes_suggestion() {
        let err = ApplyError::NoMatch {
            block_index: 1,
            near_miss: Some(NearMiss {
                block_index: 1,
                start_line: 7,
                similarity: 0.83,
                region: "let x = 2;".to_string(),
            }),
        };
        let message = err.to_string();
        assert!(message.contains("line 7"));
        assert!(message.contains("let x = 2;"));
    }

    #[test]
    fn only_no_match_and_ambiguous_trigger_fallback() {
        assert!(ApplyError::NoMatch {
            block_index: 0,
            near_miss: None
        }
        .triggers_fallback());
        assert!(ApplyError::AmbiguousMatch {
            block_index: 0,
            locations: vec![]
        }
        .triggers_fallback());
        assert!(!ApplyError::ScoreThresholdExceeded {
            score: 10,
            max_score: 5
        }
        .triggers_fallback());
        assert!(!ApplyError::BranchLimitExceeded { limit: 100 }.triggers_fallback());
    }
}
