//! Tolerance ladder: the ordered set of text normalizations the matcher may
//! apply when a stricter comparison finds nothing.
//!
//! A more permissive level is only tried once every stricter level has
//! produced zero candidates for a block, and each level carries a cost that
//! is strictly higher than the one below it. The same transform is always
//! applied to both the search pattern and the content window, so matching
//! stays symmetric.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One rung of the tolerance ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tolerance {
    /// Byte-for-byte match. Cost 0.
    Exact,
    /// Trailing whitespace stripped from every line.
    TrimTrailing,
    /// Leading and trailing whitespace stripped from every line.
    TrimWhitespace,
    /// All whitespace removed from every line.
    IgnoreWhitespace,
}

impl Tolerance {
    /// All levels, strictest first. Escalation walks this in order.
    pub const LADDER: [Tolerance; 4] = [
        Tolerance::Exact,
        Tolerance::TrimTrailing,
        Tolerance::TrimWhitespace,
        Tolerance::IgnoreWhitespace,
    ];

    /// Normalize one line for comparison under this level.
    pub fn normalize<'a>(self, line: &'a str) -> Cow<'a, str> {
        match self {
            Tolerance::Exact => Cow::Borrowed(line),
            Tolerance::TrimTrailing => Cow::Borrowed(line.trim_end()),
            Tolerance::TrimWhitespace => Cow::Borrowed(line.trim()),
            Tolerance::IgnoreWhitespace => {
                if line.contains(char::is_whitespace) {
                    Cow::Owned(line.chars().filter(|c| !c.is_whitespace()).collect())
                } else {
                    Cow::Borrowed(line)
                }
            }
        }
    }

    /// Cost in score units per pattern line when a match needed this level.
    pub fn cost_weight(self, weights: &ToleranceWeights) -> u64 {
        match self {
            Tolerance::Exact => 0,
            Tolerance::TrimTrailing => weights.trailing,
            Tolerance::TrimWhitespace => weights.indentation,
            Tolerance::IgnoreWhitespace => weights.all_whitespace,
        }
    }

    /// Levels that discard leading whitespace need the replacement's
    /// indentation reconciled against the match site.
    pub fn discards_indentation(self) -> bool {
        matches!(self, Tolerance::TrimWhitespace | Tolerance::IgnoreWhitespace)
    }

    pub fn label(self) -> &'static str {
        match self {
            Tolerance::Exact => "exact",
            Tolerance::TrimTrailing => "trim-trailing",
            Tolerance::TrimWhitespace => "trim-whitespace",
            Tolerance::IgnoreWhitespace => "ignore-whitespace",
        }
    }
}

/// Per-level cost weights, in score units per pattern line.
///
/// Invariant: `0 < trailing < indentation < all_whitespace`. The edit-set
/// loader enforces this; [`crate::EngineConfig`] documents the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceWeights {
    pub trailing: u64,
    pub indentation: u64,
    pub all_whitespace: u64,
}

impl Default for ToleranceWeights {
    fn default() -> Self {
        Self {
            trailing: 1,
            indentation: 10,
            all_whitespace: 50,
        }
    }
}

impl ToleranceWeights {
    /// Check the strictly-increasing cost invariant.
    pub fn is_strictly_increasing(&self) -> bool {
        self.trailing > 0
            && self.indentation > self.trailing
            && self.all_whitespace > self.indentation
    }
}
