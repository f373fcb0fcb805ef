//! The edit sequencer: scored, branching exploration of complete edit plans.
//!
//! Blocks are consumed in order. For each block the tolerance ladder is
//! escalated until a level yields at least one candidate, and every tied
//! candidate at that level spawns its own branch with the cursor advanced
//! past the match. A branch with a block that matches nowhere dies; a branch
//! that consumes every block emits a complete [`EditPlan`].
//!
//! Exploration uses an explicit work queue over arena-indexed nodes instead
//! of call-stack recursion, which keeps depth unbounded-safe and makes the
//! hard branch cap a single counter check.

use crate::block::SearchReplaceBlock;
use crate::engine::errors::ApplyError;
use crate::engine::finder::{find_candidates, LineMap, MatchCandidate};
use crate::engine::indent::reconcile_indentation;
use crate::engine::tolerance::Tolerance;
use crate::engine::EngineConfig;

/// One block resolved to one candidate, with the replacement text already
/// reconciled for the match site.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlannedEdit {
    pub block_index: usize,
    pub candidate: MatchCandidate,
    pub replacement: String,
}

/// A complete proposed edit sequence: exactly one candidate per block,
/// non-overlapping and in block order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EditPlan {
    pub edits: Vec<PlannedEdit>,
    pub total_score: u64,
}

/// Everything exploration produced: all complete plans, and the farthest
/// block any dead branch reached (for no-match attribution).
#[derive(Debug)]
pub(crate) struct PlanSet {
    pub plans: Vec<EditPlan>,
    pub farthest_failure: Option<usize>,
}

/// One branch state. `edit` is the step taken to reach this node; plans are
/// materialized by walking the parent chain.
struct PlanNode {
    parent: Option<usize>,
    edit: Option<PlannedEdit>,
    next_block: usize,
    cursor: usize,
    score: u64,
}

/// Explore every edit plan for `blocks` against `content`, starting the
/// first block's scan at `initial_cursor`.
pub(crate) fn plan_edits(
    content: &str,
    map: &LineMap,
    blocks: &[SearchReplaceBlock],
    config: &EngineConfig,
    initial_cursor: usize,
) -> Result<PlanSet, ApplyError> {
    let mut arena: Vec<PlanNode> = vec![PlanNode {
        parent: None,
        edit: None,
        next_block: 0,
        cursor: initial_cursor,
        score: 0,
    }];
    let mut worklist: Vec<usize> = vec![0];
    let mut plans: Vec<EditPlan> = Vec::new();
    let mut farthest_failure: Option<usize> = None;
    let mut expanded = 0usize;

    while let Some(node_index) = worklist.pop() {
        expanded += 1;
        if expanded > config.max_branches {
            return Err(ApplyError::BranchLimitExceeded {
                limit: config.max_branches,
            });
        }

        let (next_block, cursor, score) = {
            let node = &arena[node_index];
            (node.next_block, node.cursor, node.score)
        };

        if next_block == blocks.len() {
            plans.push(materialize(&arena, node_index, score));
            continue;
        }

        let block = &blocks[next_block];
        match escalate(content, map, block, cursor) {
            Some((tolerance, candidates)) => {
                let step_cost =
                    tolerance.cost_weight(&config.weights) * block.search_lines().len() as u64;
                for candidate in candidates {
                    let replacement = build_replacement(content, map, block, &candidate);
                    arena.push(PlanNode {
                        parent: Some(node_index),
                        edit: Some(PlannedEdit {
                            block_index: next_block,
                            candidate,
                            replacement,
                        }),
                        next_block: next_block + 1,
                        cursor: candidate.end,
                        score: score + step_cost,
                    });
                    worklist.push(arena.len() - 1);
                }
            }
            None => {
                // Branch dies here; remember the farthest block any branch
                // got stuck on so NoMatch points at the actionable one.
                farthest_failure = Some(farthest_failure.map_or(next_block, |f| f.max(next_block)));
            }
        }
    }

    Ok(PlanSet {
        plans,
        farthest_failure,
    })
}

/// Walk the ladder until some level yields candidates. All candidates at
/// that level are kept; stricter levels win outright.
fn escalate(
    content: &str,
    map: &LineMap,
    block: &SearchReplaceBlock,
    cursor: usize,
) -> Option<(Tolerance, Vec<MatchCandidate>)> {
    for tolerance in Tolerance::LADDER {
        let candidates = find_candidates(content, map, block, cursor, tolerance);
        if !candidates.is_empty() {
            return Some((tolerance, candidates));
        }
    }
    None
}

/// Replacement text for one candidate, indentation-reconciled when the
/// accepted tolerance discarded indentation.
fn build_replacement(
    content: &str,
    map: &LineMap,
    block: &SearchReplaceBlock,
    candidate: &MatchCandidate,
) -> String {
    match candidate.tolerance {
        Tolerance::Exact => block.replace.clone(),
        Tolerance::TrimTrailing => block.replace_lines().join("\n"),
        Tolerance::TrimWhitespace | Tolerance::IgnoreWhitespace => {
            let search_lines = block.search_lines();
            let first_line = map.line_of(candidate.start);
            let matched_lines: Vec<&str> = (0..search_lines.len())
                .map(|offset| map.line(content, first_line + offset))
                .collect();
            reconcile_indentation(&matched_lines, &search_lines, &block.replace_lines()).join("\n")
        }
    }
}

fn materialize(arena: &[PlanNode], leaf: usize, total_score: u64) -> EditPlan {
    let mut edits = Vec::new();
    let mut current = Some(leaf);
    while let Some(index) = current {
        let node = &arena[index];
        if let Some(edit) = &node.edit {
            edits.push(edit.clone());
        }
        current = node.parent;
    }
    edits.reverse();
    EditPlan { edits, total_score }
}
