//! The tolerant search/replace engine.
//!
//! A pure function of `(content, blocks, config)`: no I/O, no shared state,
//! no suspension points. Callers hand it the full file text and an ordered
//! list of [`SearchReplaceBlock`]s; it hands back the edited text with
//! per-block tolerance reports, or a structured error precise enough to act
//! on.
//!
//! Two entry points:
//! - [`apply_batch_strict`] — all-or-nothing over the whole block list.
//! - [`apply_blocks`] — batch first; on an ambiguity or a missing match it
//!   retries block-by-block and reports a composite per-block outcome.
//!
//! Per invocation the engine moves through
//! `Planning → {Applied | Ambiguous | Failed}`, and on the fallback path
//! `Ambiguous | Failed → FallbackApplying → PartiallyApplied | FullyFailed`.

pub mod errors;
pub mod finder;
pub mod indent;
pub mod nearmiss;
pub mod planner;
pub mod select;
pub mod tolerance;

use crate::block::SearchReplaceBlock;
use serde::Serialize;

pub use errors::ApplyError;
pub use finder::{LineMap, MatchCandidate};
pub use nearmiss::NearMiss;
pub use tolerance::{Tolerance, ToleranceWeights};

use planner::{plan_edits, EditPlan};
use select::select_best;

/// Engine thresholds and cost weights.
///
/// Defaults: tolerance weights 1/10/50 score units per pattern line,
/// `max_score` 1000, `max_branches` 10_000 explored plan states. All are
/// deliberate configuration surface; the original system left them
/// underspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    pub weights: ToleranceWeights,
    /// Reject any plan costing more than this, even when it is the only one.
    pub max_score: u64,
    /// Hard cap on explored plan states; past it the engine aborts with
    /// [`ApplyError::BranchLimitExceeded`] instead of blowing up on
    /// adversarial inputs.
    pub max_branches: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ToleranceWeights::default(),
            max_score: 1000,
            max_branches: 10_000,
        }
    }
}

/// Which tolerance level a block ultimately matched at. Anything above
/// [`Tolerance::Exact`] is worth surfacing to the caller as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockReport {
    pub block_index: usize,
    pub tolerance: Tolerance,
}

/// A successful batch application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use = "AppliedEdit carries the edited content"]
pub struct AppliedEdit {
    pub content: String,
    pub reports: Vec<BlockReport>,
}

/// Per-block result from the fallback pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BlockOutcome {
    Applied {
        block_index: usize,
        tolerance: Tolerance,
    },
    Failed {
        block_index: usize,
        error: ApplyError,
    },
}

impl BlockOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, BlockOutcome::Applied { .. })
    }

    pub fn block_index(&self) -> usize {
        match self {
            BlockOutcome::Applied { block_index, .. }
            | BlockOutcome::Failed { block_index, .. } => *block_index,
        }
    }
}

/// Terminal state of [`apply_blocks`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
#[must_use = "PatchOutcome carries the edited content"]
pub enum PatchOutcome {
    /// The strict batch pass succeeded.
    Applied(AppliedEdit),
    /// The batch pass failed but at least one block applied individually.
    PartiallyApplied {
        content: String,
        outcomes: Vec<BlockOutcome>,
    },
    /// No block could be applied even individually.
    FullyFailed { outcomes: Vec<BlockOutcome> },
}

/// Apply the whole block list or nothing.
///
/// Plans every block in order against `content`, selects the cheapest
/// complete plan, and splices it. Errors are structured; see
/// [`ApplyError`].
pub fn apply_batch_strict(
    content: &str,
    blocks: &[SearchReplaceBlock],
    config: &EngineConfig,
) -> Result<AppliedEdit, ApplyError> {
    let map = LineMap::new(content);
    let set = plan_edits(content, &map, blocks, config, 0)?;
    let plan = select_best(content, &map, blocks, set, config)?;
    Ok(splice_plan(content, &plan))
}

/// Apply the block list: strict batch first, per-block fallback on
/// ambiguity or a missing match.
///
/// In fallback mode each block is applied against the content as modified
/// so far, scanning from the cursor left by the last *successful* block; a
/// failed block changes neither the content nor the cursor. Threshold and
/// branch-cap violations on the batch pass are fatal and surface as `Err` —
/// retrying per block cannot make a too-loose match trustworthy.
pub fn apply_blocks(
    content: &str,
    blocks: &[SearchReplaceBlock],
    config: &EngineConfig,
) -> Result<PatchOutcome, ApplyError> {
    match apply_batch_strict(content, blocks, config) {
        Ok(applied) => Ok(PatchOutcome::Applied(applied)),
        Err(err) if err.triggers_fallback() => Ok(apply_individually(content, blocks, config)),
        Err(err) => Err(err),
    }
}

/// The individual fallback pass: best-effort, block-isolated.
fn apply_individually(
    content: &str,
    blocks: &[SearchReplaceBlock],
    config: &EngineConfig,
) -> PatchOutcome {
    let mut current = content.to_string();
    let mut cursor = 0usize;
    let mut outcomes = Vec::with_capacity(blocks.len());

    for (block_index, block) in blocks.iter().enumerate() {
        match apply_single(&current, block, cursor, config) {
            Ok((next_content, edit_start, replacement_len, tolerance)) => {
                current = next_content;
                cursor = edit_start + replacement_len;
                outcomes.push(BlockOutcome::Applied {
                    block_index,
                    tolerance,
                });
            }
            Err(error) => {
                let error = reindex_error(error, block_index);
                outcomes.push(BlockOutcome::Failed { block_index, error });
            }
        }
    }

    if outcomes.iter().any(BlockOutcome::is_applied) {
        PatchOutcome::PartiallyApplied {
            content: current,
            outcomes,
        }
    } else {
        PatchOutcome::FullyFailed { outcomes }
    }
}

/// Plan and apply one block against `content` from `cursor`.
fn apply_single(
    content: &str,
    block: &SearchReplaceBlock,
    cursor: usize,
    config: &EngineConfig,
) -> Result<(String, usize, usize, Tolerance), ApplyError> {
    let map = LineMap::new(content);
    let single = std::slice::from_ref(block);
    let set = plan_edits(content, &map, single, config, cursor)?;
    let plan = select_best(content, &map, single, set, config)?;
    let edit = &plan.edits[0];
    let applied = splice_plan(content, &plan);
    Ok((
        applied.content,
        edit.candidate.start,
        edit.replacement.len(),
        edit.candidate.tolerance,
    ))
}

/// Errors from a single-block plan carry block index 0; restore the block's
/// position in the original list.
fn reindex_error(error: ApplyError, block_index: usize) -> ApplyError {
    match error {
        ApplyError::NoMatch { near_miss, .. } => ApplyError::NoMatch {
            block_index,
            near_miss: near_miss.map(|miss| miss.with_block_index(block_index)),
        },
        ApplyError::AmbiguousMatch { locations, .. } => ApplyError::AmbiguousMatch {
            block_index,
            locations,
        },
        other => other,
    }
}

/// Splice a selected plan into the content. Edits are in block order, which
/// the cursor invariant guarantees is ascending and non-overlapping.
fn splice_plan(content: &str, plan: &EditPlan) -> AppliedEdit {
    let mut out = String::with_capacity(content.len());
    let mut pos = 0;
    let mut reports = Vec::with_capacity(plan.edits.len());
    for edit in &plan.edits {
        debug_assert!(edit.candidate.start >= pos);
        out.push_str(&content[pos..edit.candidate.start]);
        out.push_str(&edit.replacement);
        pos = edit.candidate.end;
        reports.push(BlockReport {
            block_index: edit.block_index,
            tolerance: edit.candidate.tolerance,
        });
    }
    out.push_str(&content[pos..]);
    AppliedEdit {
        content: out,
        reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(pairs: &[(&str, &str)]) -> Vec<SearchReplaceBlock> {
        pairs
            .iter()
            .map(|(s, r)| SearchReplaceBlock::new(*s, *r))
            .collect()
    }

    #[test]
    fn strict_batch_replaces_unique_occurrence() {
        let applied = apply_batch_strict(
            "def foo():\n    return 1\n",
            &blocks(&[("return 1", "return 2")]),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(applied.content, "def foo():\n    return 2\n");
        assert_eq!(applied.reports[0].tolerance, Tolerance::Exact);
    }

    #[test]
    fn noop_block_leaves_content_unchanged() {
        let content = "a\nb\nc\n";
        let applied = apply_batch_strict(
            content,
            &blocks(&[("b", "b")]),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(applied.content, content);
    }

    #[test]
    fn sequential_blocks_respect_cursor_order() {
        let applied = apply_batch_strict(
            "A\nB\nA\n",
            &blocks(&[("A", "X"), ("A", "Y")]),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(applied.content, "X\nB\nY\n");
    }

    #[test]
    fn duplicate_occurrences_are_ambiguous_not_guessed() {
        let err = apply_batch_strict(
            "x = 1\nx = 1\n",
            &blocks(&[("x = 1", "x = 2")]),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ApplyError::AmbiguousMatch { block_index: 0, .. }));
    }

    #[test]
    fn indentation_match_adopts_site_indentation() {
        let applied = apply_batch_strict(
            "    if ready {\n        go();\n    }\n",
            &blocks(&[("if ready {\n    go();\n}", "if ready {\n    stop();\n}")]),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(applied.content, "    if ready {\n        stop();\n    }\n");
        assert_eq!(applied.reports[0].tolerance, Tolerance::TrimWhitespace);
    }

    #[test]
    fn fallback_applies_remaining_blocks_after_ambiguity() {
        // Block 0 is ambiguous in the batch; individually, cursor advance
        // from block 0's first match would fix it, but ambiguity is still
        // ambiguity for that block alone. Block 1 is unique and applies.
        let outcome = apply_blocks(
            "dup\ndup\nunique\n",
            &blocks(&[("dup", "D"), ("unique", "U")]),
            &EngineConfig::default(),
        )
        .unwrap();
        match outcome {
            PatchOutcome::PartiallyApplied { content, outcomes } => {
                assert_eq!(content, "dup\ndup\nU\n");
                assert!(!outcomes[0].is_applied());
                assert!(outcomes[1].is_applied());
            }
            other => panic!("expected PartiallyApplied, got {other:?}"),
        }
    }

    #[test]
    fn fully_failed_when_no_block_applies() {
        let outcome = apply_blocks(
            "alpha\n",
            &blocks(&[("missing", "x"), ("also missing", "y")]),
            &EngineConfig::default(),
        )
        .unwrap();
        match outcome {
            PatchOutcome::FullyFailed { outcomes } => {
                assert_eq!(outcomes.len(), 2);
                assert!(outcomes.iter().all(|o| !o.is_applied()));
            }
            other => panic!("expected FullyFailed, got {other:?}"),
        }
    }

    #[test]
    fn fallback_failed_block_does_not_advance_cursor() {
        // Block 1 fails; block 2 must still be able to match text right
        // after block 0's match site, at the cursor block 0 left behind.
        let outcome = apply_blocks(
            "alpha\nbeta\ngamma\n",
            &blocks(&[("alpha", "A"), ("missing", "x"), ("beta", "B")]),
            &EngineConfig::default(),
        )
        .unwrap();
        match outcome {
            PatchOutcome::PartiallyApplied { content, outcomes } => {
                assert_eq!(content, "A\nB\ngamma\n");
                assert!(outcomes[0].is_applied());
                assert!(!outcomes[1].is_applied());
                assert!(outcomes[2].is_applied());
            }
            other => panic!("expected PartiallyApplied, got {other:?}"),
        }
    }

    #[test]
    fn batch_threshold_violation_is_fatal_not_fallback() {
        let config = EngineConfig {
            max_score: 0,
            ..EngineConfig::default()
        };
        // Matches only at trim-trailing, so the cheapest plan costs 2 > 0.
        let err = apply_blocks(
            "value  \nvalue  \nend\n",
            &blocks(&[("value\nvalue", "swap")]),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, ApplyError::ScoreThresholdExceeded { .. }));
    }

    #[test]
    fn fallback_error_keeps_original_block_index() {
        let outcome = apply_blocks(
            "one\ntwo\n",
            &blocks(&[("one", "1"), ("absent", "x")]),
            &EngineConfig::default(),
        )
        .unwrap();
        match outcome {
            PatchOutcome::PartiallyApplied { outcomes, .. } => match &outcomes[1] {
                BlockOutcome::Failed { error, .. } => {
                    assert_eq!(error.block_index(), Some(1));
                }
                other => panic!("expected Failed, got {other:?}"),
            },
            other => panic!("expected PartiallyApplied, got {other:?}"),
        }
    }
}
