use serde::{Deserialize, Serialize};

/// One requested edit: find `search` in the content, replace it with `replace`.
///
/// Blocks are immutable once constructed and are applied in the order they
/// are supplied; a later block never matches text before an earlier block's
/// match site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReplaceBlock {
    /// The text to locate. May span multiple lines.
    pub search: String,
    /// The text to substitute at the match site.
    pub replace: String,
}

impl SearchReplaceBlock {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }

    /// Search text as lines, with the empty tail from a trailing newline
    /// dropped so `"x = 1\n"` means the single line `x = 1`.
    pub(crate) fn search_lines(&self) -> Vec<&str> {
        split_block_lines(&self.search)
    }

    /// Replace text as lines, same trailing-newline convention as
    /// [`search_lines`](Self::search_lines).
    pub(crate) fn replace_lines(&self) -> Vec<&str> {
        split_block_lines(&self.replace)
    }
}

/// Split block text on `\n`, dropping exactly one trailing empty element.
///
/// `split('\n')` yields a final `""` for text ending in a newline; keeping it
/// would make every such block demand an extra empty line at the match site.
fn split_block_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    if lines.len() > 1 && lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_lines_drop_single_trailing_newline() {
        let block = SearchReplaceBlock::new("x = 1\n", "x = 2\n");
        assert_eq!(block.search_lines(), vec!["x = 1"]);
        assert_eq!(block.replace_lines(), vec!["x = 2"]);
    }

    #[test]
    fn intentional_trailing_blank_line_is_kept() {
        let block = SearchReplaceBlock::new("foo\n\n", "foo\n\n");
        assert_eq!(block.search_lines(), vec!["foo", ""]);
    }

    #[test]
    fn single_line_without_newline() {
        let block = SearchReplaceBlock::new("return 1", "return 2");
        assert_eq!(block.search_lines(), vec!["return 1"]);
    }
}
