use crate::block::SearchReplaceBlock;
use crate::engine::{EngineConfig, ToleranceWeights};
use serde::Deserialize;
use std::fmt;

/// A TOML edit set: ordered search/replace edits grouped under one name,
/// with optional engine threshold overrides.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditSet {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub engine: EngineOverrides,
    #[serde(default)]
    pub edits: Vec<EditDefinition>,
}

impl EditSet {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.edits.is_empty() {
            issues.push(ValidationIssue::EmptyEditList);
        }

        for (index, edit) in self.edits.iter().enumerate() {
            if edit.file.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    edit_index: index,
                    field: "file",
                });
            }
            if edit.search.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    edit_index: index,
                    field: "search",
                });
            }
        }

        let weights = self.engine.weights();
        if !weights.is_strictly_increasing() {
            issues.push(ValidationIssue::InvalidEngine {
                message: format!(
                    "tolerance weights must strictly increase: trailing {} < indentation {} < all_whitespace {}",
                    weights.trailing, weights.indentation, weights.all_whitespace
                ),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Engine configuration with this edit set's overrides applied.
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            weights: self.engine.weights(),
            max_score: self.engine.max_score.unwrap_or(defaults.max_score),
            max_branches: self.engine.max_branches.unwrap_or(defaults.max_branches),
        }
    }

    /// Edits targeting `file`, in definition order, as engine blocks.
    pub fn blocks_for_file(&self, file: &str) -> Vec<SearchReplaceBlock> {
        self.edits
            .iter()
            .filter(|edit| edit.file == file)
            .map(|edit| SearchReplaceBlock::new(edit.search.clone(), edit.replace.clone()))
            .collect()
    }

    /// Target files in first-seen order.
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        for edit in &self.edits {
            if !files.contains(&edit.file.as_str()) {
                files.push(&edit.file);
            }
        }
        files
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One search/replace edit against one file.
#[derive(Debug, Deserialize, Clone)]
pub struct EditDefinition {
    pub file: String,
    pub search: String,
    #[serde(default)]
    pub replace: String,
}

/// Optional `[engine]` table. Absent fields fall back to
/// [`EngineConfig::default`].
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EngineOverrides {
    #[serde(default)]
    pub trailing_weight: Option<u64>,
    #[serde(default)]
    pub indentation_weight: Option<u64>,
    #[serde(default)]
    pub all_whitespace_weight: Option<u64>,
    #[serde(default)]
    pub max_score: Option<u64>,
    #[serde(default)]
    pub max_branches: Option<usize>,
}

impl EngineOverrides {
    fn weights(&self) -> ToleranceWeights {
        let defaults = ToleranceWeights::default();
        ToleranceWeights {
            trailing: self.trailing_weight.unwrap_or(defaults.trailing),
            indentation: self.indentation_weight.unwrap_or(defaults.indentation),
            all_whitespace: self.all_whitespace_weight.unwrap_or(defaults.all_whitespace),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyEditList,
    MissingField {
        edit_index: usize,
        field: &'static str,
    },
    InvalidEngine {
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyEditList => write!(f, "edit set contains no edits"),
            ValidationIssue::MissingField { edit_index, field } => {
                write!(f, "edit {edit_index} missing required field '{field}'")
            }
            ValidationIssue::InvalidEngine { message } => {
                write!(f, "invalid engine configuration: {message}")
            }
        }
    }
}
