//! Plan selection: pick the cheapest complete plan, or explain precisely why
//! none can be trusted.

use crate::block::SearchReplaceBlock;
use crate::engine::errors::ApplyError;
use crate::engine::finder::LineMap;
use crate::engine::nearmiss::find_near_miss;
use crate::engine::planner::{EditPlan, PlanSet};
use crate::engine::EngineConfig;

/// Reduce a [`PlanSet`] to the single plan to apply.
///
/// Failure modes, in the order they are detected:
/// - no complete plan → [`ApplyError::NoMatch`] for the farthest block any
///   branch reached, with its near-miss diagnostic;
/// - two or more cheapest plans → [`ApplyError::AmbiguousMatch`] naming the
///   first block whose chosen location diverges, with the divergent lines;
/// - the cheapest plan costs more than `max_score` →
///   [`ApplyError::ScoreThresholdExceeded`].
pub(crate) fn select_best(
    content: &str,
    map: &LineMap,
    blocks: &[SearchReplaceBlock],
    set: PlanSet,
    config: &EngineConfig,
) -> Result<EditPlan, ApplyError> {
    if set.plans.is_empty() {
        let block_index = set.farthest_failure.unwrap_or(0);
        let near_miss = blocks.get(block_index).and_then(|block| {
            find_near_miss(content, map, &block.search)
                .map(|miss| miss.with_block_index(block_index))
        });
        return Err(ApplyError::NoMatch {
            block_index,
            near_miss,
        });
    }

    let min_score = set
        .plans
        .iter()
        .map(|plan| plan.total_score)
        .min()
        .expect("plans checked non-empty");
    let minimal: Vec<&EditPlan> = set
        .plans
        .iter()
        .filter(|plan| plan.total_score == min_score)
        .collect();

    if minimal.len() > 1 {
        let (block_index, locations) = first_divergence(map, &minimal);
        return Err(ApplyError::AmbiguousMatch {
            block_index,
            locations,
        });
    }

    if min_score > config.max_score {
        return Err(ApplyError::ScoreThresholdExceeded {
            score: min_score,
            max_score: config.max_score,
        });
    }

    Ok(minimal[0].clone())
}

/// First block, in order, whose chosen candidate differs between tied
/// plans, together with the distinct 1-based lines it was placed at.
fn first_divergence(map: &LineMap, plans: &[&EditPlan]) -> (usize, Vec<usize>) {
    let block_count = plans[0].edits.len();
    for block_index in 0..block_count {
        let mut starts: Vec<usize> = plans
            .iter()
            .map(|plan| plan.edits[block_index].candidate.start)
            .collect();
        starts.sort_unstable();
        starts.dedup();
        if starts.len() > 1 {
            let locations = starts
                .into_iter()
                .map(|start| map.line_number_of(start))
                .collect();
            return (block_index, locations);
        }
    }
    // Tied plans that never diverge cannot come out of exploration; keep a
    // deterministic answer anyway.
    (0, Vec::new())
}
