//! Blockpatch: a tolerant search/replace patch engine.
//!
//! Given a file's full text and an ordered list of search/replace blocks,
//! the engine locates each search block — tolerating whitespace and
//! indentation drift — and produces the edited text, or a structured
//! diagnostic when it cannot do so confidently.
//!
//! # Architecture
//!
//! Matching escalates a tolerance ladder (exact → trim-trailing →
//! trim-whitespace → ignore-whitespace) per block, and a branching planner
//! explores every tied candidate rather than guessing. The cheapest
//! complete plan wins; a tie is an [`ApplyError::AmbiguousMatch`], never a
//! silent pick. Matches that needed indentation stripping get their
//! replacement re-indented to the site that actually matched.
//!
//! # Safety
//!
//! - The engine is a pure function: no I/O, no shared state.
//! - Branch exploration is hard-capped; adversarial inputs abort with
//!   [`ApplyError::BranchLimitExceeded`] instead of blowing up.
//! - Matches looser than the configured score threshold are rejected.
//!
//! # Example
//!
//! ```
//! use blockpatch::{apply_blocks, EngineConfig, PatchOutcome, SearchReplaceBlock};
//!
//! let content = "def foo():\n    return 1\n";
//! let blocks = [SearchReplaceBlock::new("return 1", "return 2")];
//!
//! match apply_blocks(content, &blocks, &EngineConfig::default()) {
//!     Ok(PatchOutcome::Applied(edit)) => {
//!         assert_eq!(edit.content, "def foo():\n    return 2\n");
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod block;
pub mod config;
pub mod engine;
pub mod writer;

// Re-exports
pub use block::SearchReplaceBlock;
pub use config::{load_from_path, load_from_str, ConfigError, EditDefinition, EditSet};
pub use engine::{
    apply_batch_strict, apply_blocks, ApplyError, AppliedEdit, BlockOutcome, BlockReport,
    EngineConfig, NearMiss, PatchOutcome, Tolerance, ToleranceWeights,
};
pub use writer::atomic_write;
