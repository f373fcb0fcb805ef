//! Near-miss diagnostics for blocks that match nowhere.
//!
//! When every tolerance level yields zero candidates, the most useful thing
//! to tell the caller is the region of the file that looks *closest* to the
//! search block. This slides a window of the search block's line count over
//! the content and scores each window with a normalized Levenshtein ratio,
//! with explicit input bounds so a pathological file cannot turn the
//! diagnostic path into an O(m*n) blowup.

use crate::engine::finder::LineMap;
use serde::Serialize;

/// Cap on windows scored per scan. Windows past the cap are not scored;
/// the best among the scanned prefix is still reported.
const MAX_SCAN_WINDOWS: usize = 20_000;

/// Maximum character count per Levenshtein input. Oversized comparisons are
/// skipped with a zero ratio instead of paying the quadratic pass.
const MAX_COMPARE_CHARS: usize = 10_000;

/// Closest approximate region found for an unmatched block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearMiss {
    /// Index of the block that failed to match.
    pub block_index: usize,
    /// 1-based line where the closest region starts.
    pub start_line: usize,
    /// Normalized similarity in `[0.0, 1.0]`.
    pub similarity: f64,
    /// The closest region's text, verbatim from the content.
    pub region: String,
}

impl NearMiss {
    pub(crate) fn with_block_index(mut self, block_index: usize) -> Self {
        self.block_index = block_index;
        self
    }
}

fn bounded_similarity(a: &str, b: &str) -> f64 {
    if a.chars().count() > MAX_COMPARE_CHARS || b.chars().count() > MAX_COMPARE_CHARS {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b)
}

/// Scan the full content for the line run most similar to `search_text`.
///
/// Returns `None` only for empty content or an empty search block. The
/// reported region is always a verbatim substring of `content`.
pub fn find_near_miss(content: &str, map: &LineMap, search_text: &str) -> Option<NearMiss> {
    if content.is_empty() || search_text.is_empty() {
        return None;
    }

    // Same trailing-newline convention as block line splitting: "foo\n" is
    // one line, not two.
    let mut search_line_count = search_text.split('\n').count();
    if search_line_count > 1 && search_text.ends_with('\n') {
        search_line_count -= 1;
    }
    let window = search_line_count.min(map.len()).max(1);

    let mut best: Option<NearMiss> = None;
    let last_start = map.len() - window;
    for line in 0..=last_start.min(MAX_SCAN_WINDOWS) {
        let start = map.start(line);
        let end = map.end(line + window - 1);
        let region = &content[start..end];
        let similarity = bounded_similarity(region, search_text);
        let better = match &best {
            Some(current) => similarity > current.similarity,
            None => true,
        };
        if better {
            best = Some(NearMiss {
                block_index: 0,
                start_line: line + 1,
                similarity,
                region: region.to_string(),
            });
        }
    }
    best
}
