//! Edit-set configuration: the typed TOML format the CLI feeds the engine.
//!
//! An edit set names its target files and carries ordered search/replace
//! pairs plus optional engine threshold overrides:
//!
//! ```toml
//! [meta]
//! name = "rename-handler"
//!
//! [engine]
//! max_score = 200
//!
//! [[edits]]
//! file = "src/server.rs"
//! search = """
//! fn handle(req: Request) {
//! """
//! replace = """
//! fn handle_request(req: Request) {
//! """
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    EditDefinition, EditSet, EngineOverrides, Metadata, ValidationError, ValidationIssue,
};
