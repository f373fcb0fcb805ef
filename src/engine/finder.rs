//! Match discovery: every non-overlapping occurrence of a pattern in the
//! content at or after a cursor, under one tolerance transform.
//!
//! The exact level matches the raw search text as a substring, so a
//! single-line pattern can match inside a line. Every tolerant level matches
//! whole-line runs: the transformed pattern lines must equal the transformed
//! content lines of a contiguous window with the same pre-transform line
//! count.

use crate::block::SearchReplaceBlock;
use crate::engine::tolerance::Tolerance;
use serde::Serialize;

/// One found occurrence. Offsets are byte positions into the content; for
/// line-run matches `end` excludes the final line's newline so a splice
/// leaves surrounding line breaks intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchCandidate {
    pub start: usize,
    pub end: usize,
    pub tolerance: Tolerance,
}

/// Byte spans of each line of a content string, newline excluded.
///
/// `"a\nb\n"` indexes as three lines: `a`, `b`, and the empty line after the
/// final newline; joining the spans back with `\n` reproduces the content
/// exactly.
#[derive(Debug)]
pub struct LineMap {
    spans: Vec<(usize, usize)>,
}

impl LineMap {
    pub fn new(content: &str) -> Self {
        let mut spans = Vec::new();
        let mut offset = 0;
        for line in content.split('\n') {
            spans.push((offset, offset + line.len()));
            offset += line.len() + 1;
        }
        Self { spans }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn start(&self, index: usize) -> usize {
        self.spans[index].0
    }

    pub fn end(&self, index: usize) -> usize {
        self.spans[index].1
    }

    pub fn line<'a>(&self, content: &'a str, index: usize) -> &'a str {
        let (start, end) = self.spans[index];
        &content[start..end]
    }

    /// Index of the first line starting at or after `offset`; `len()` when
    /// no line does.
    pub fn first_line_at_or_after(&self, offset: usize) -> usize {
        self.spans.partition_point(|&(start, _)| start < offset)
    }

    /// Index of the line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.spans
            .partition_point(|&(start, _)| start <= offset)
            .saturating_sub(1)
    }

    /// 1-based line number for diagnostics.
    pub fn line_number_of(&self, offset: usize) -> usize {
        self.line_of(offset) + 1
    }
}

/// All non-overlapping candidates for `block` at `tolerance`, scanning left
/// to right from `cursor`.
pub fn find_candidates(
    content: &str,
    map: &LineMap,
    block: &SearchReplaceBlock,
    cursor: usize,
    tolerance: Tolerance,
) -> Vec<MatchCandidate> {
    match tolerance {
        Tolerance::Exact => find_exact(content, &block.search, cursor),
        _ => find_line_runs(content, map, &block.search_lines(), cursor, tolerance),
    }
}

fn find_exact(content: &str, pattern: &str, cursor: usize) -> Vec<MatchCandidate> {
    if pattern.is_empty() {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut from = cursor.min(content.len());
    while let Some(pos) = content[from..].find(pattern) {
        let start = from + pos;
        let end = start + pattern.len();
        candidates.push(MatchCandidate {
            start,
            end,
            tolerance: Tolerance::Exact,
        });
        from = end;
    }
    candidates
}

fn find_line_runs(
    content: &str,
    map: &LineMap,
    pattern_lines: &[&str],
    cursor: usize,
    tolerance: Tolerance,
) -> Vec<MatchCandidate> {
    let run_len = pattern_lines.len();
    let total = map.len();
    if run_len == 0 || run_len > total {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut line = map.first_line_at_or_after(cursor);
    while line + run_len <= total {
        let matched = pattern_lines.iter().enumerate().all(|(offset, pattern)| {
            tolerance.normalize(map.line(content, line + offset))
                == tolerance.normalize(pattern)
        });
        if matched {
            candidates.push(MatchCandidate {
                start: map.start(line),
                end: map.end(line + run_len - 1),
                tolerance,
            });
            line += run_len;
        } else {
            line += 1;
        }
    }
    candidates
}
