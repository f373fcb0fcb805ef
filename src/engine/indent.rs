//! Indentation reconciliation for matches found after indentation was
//! discarded.
//!
//! When a block only matches once leading whitespace is stripped, the
//! replacement text still carries the search block's original indentation.
//! Splicing it verbatim would re-indent the site to the block author's
//! guess; instead, the per-line difference between the matched region's
//! actual indentation and the search block's indentation is applied to the
//! replacement, line-index aligned.

/// Leading whitespace of a line.
fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}

/// Signed indentation delta, in characters, between a matched line and the
/// corresponding search line.
fn indent_delta(matched: &str, search: &str) -> isize {
    let matched_indent = leading_whitespace(matched);
    let search_indent = leading_whitespace(search);
    matched_indent.chars().count() as isize - search_indent.chars().count() as isize
}

/// Shift one replacement line by `delta` characters of indentation, reusing
/// the matched line's actual whitespace characters when adding so tabs
/// survive. Empty lines are left alone.
fn shift_line(line: &str, delta: isize, matched: &str) -> String {
    if delta == 0 || line.is_empty() {
        return line.to_string();
    }
    if delta > 0 {
        let prefix: String = leading_whitespace(matched)
            .chars()
            .take(delta as usize)
            .collect();
        // The matched indent can be shorter than the delta when the search
        // line itself was indented; pad with spaces for the remainder.
        let missing = (delta as usize).saturating_sub(prefix.chars().count());
        format!("{}{}{}", prefix, " ".repeat(missing), line)
    } else {
        let strip = (-delta) as usize;
        let mut chars = line.char_indices();
        let mut removed = 0;
        for (idx, c) in &mut chars {
            if removed == strip || !c.is_whitespace() {
                return line[idx..].to_string();
            }
            removed += 1;
        }
        String::new()
    }
}

/// Rewrite `replace_lines` so their indentation matches the region that
/// actually matched.
///
/// Per-line: the delta between `matched_lines[i]` and `search_lines[i]` is
/// applied to `replace_lines[i]`. When the replace block has a different
/// line count than the search block there is no per-line alignment, so the
/// first line's delta is applied uniformly to every replacement line.
pub fn reconcile_indentation(
    matched_lines: &[&str],
    search_lines: &[&str],
    replace_lines: &[&str],
) -> Vec<String> {
    if matched_lines.is_empty() || search_lines.is_empty() {
        return replace_lines.iter().map(|l| (*l).to_string()).collect();
    }

    let aligned = replace_lines.len() == search_lines.len()
        && matched_lines.len() == search_lines.len();

    if aligned {
        replace_lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let delta = indent_delta(matched_lines[i], search_lines[i]);
                shift_line(line, delta, matched_lines[i])
            })
            .collect()
    } else {
        let delta = indent_delta(matched_lines[0], search_lines[0]);
        replace_lines
            .iter()
            .map(|line| shift_line(line, delta, matched_lines[0]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_delta_leaves_lines_untouched() {
        let result = reconcile_indentation(
            &["    a", "    b"],
            &["    a", "    b"],
            &["    x", "    y"],
        );
        assert_eq!(result, vec!["    x", "    y"]);
    }

    #[test]
    fn adds_site_indentation_per_line() {
        let matched = ["    fn test() {", "        code()", "    }"];
        let search = ["fn test() {", "    code()", "}"];
        let replace = ["fn renamed() {", "    other()", "}"];
        let result = reconcile_indentation(&matched, &search, &replace);
        assert_eq!(result, vec!["    fn renamed() {", "        other()", "    }"]);
    }

    #[test]
    fn strips_indentation_when_site_is_shallower() {
        let matched = ["fn test() {", "    code()", "}"];
        let search = ["    fn test() {", "        code()", "    }"];
        let replace = ["    fn renamed() {", "        other()", "    }"];
        let result = reconcile_indentation(&matched, &search, &replace);
        assert_eq!(result, vec!["fn renamed() {", "    other()", "}"]);
    }

    #[test]
    fn mismatched_line_counts_use_first_line_delta() {
        let matched = ["        call()"];
        let search = ["call()"];
        let replace = ["before()", "call()", "after()"];
        let result = reconcile_indentation(&matched, &search, &replace);
        assert_eq!(
            result,
            vec!["        before()", "        call()", "        after()"]
        );
    }

    #[test]
    fn preserves_tabs_from_match_site() {
        let matched = ["\t\tcall()"];
        let search = ["call()"];
        let replace = ["other()"];
        let result = reconcile_indentation(&matched, &search, &replace);
        assert_eq!(result, vec!["\t\tother()"]);
    }

    #[test]
    fn empty_replacement_lines_stay_empty() {
        let matched = ["    a"];
        let search = ["a"];
        let replace = ["x", "", "y"];
        let result = reconcile_indentation(&matched, &search, &replace);
        assert_eq!(result, vec!["    x", "", "    y"]);
    }

    #[test]
    fn never_strips_non_whitespace() {
        let matched = ["a()"];
        let search = ["        a()"];
        let replace = ["  b()"];
        // Delta asks for 8 stripped chars but only 2 are whitespace.
        let result = reconcile_indentation(&matched, &search, &replace);
        assert_eq!(result, vec!["b()"]);
    }
}
