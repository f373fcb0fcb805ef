use anyhow::Result;
use blockpatch::config::{load_from_path, EditSet};
use blockpatch::{
    apply_blocks, atomic_write, ApplyError, BlockOutcome, PatchOutcome, Tolerance,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "blockpatch")]
#[command(about = "Tolerant search/replace patch engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply edit sets to a workspace
    Apply {
        /// Path to workspace root (current directory if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Specific edit-set file to apply (otherwise applies all in edits/)
        #[arg(short, long)]
        edits: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Emit a machine-readable JSON report instead of colored output
        #[arg(long)]
        json: bool,
    },

    /// Check whether edit sets would apply cleanly, without writing
    Check {
        /// Path to workspace root (current directory if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Specific edit-set file to check
        #[arg(short, long)]
        edits: Option<PathBuf>,
    },

    /// List available edit sets
    List {
        /// Path to workspace root (current directory if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            workspace,
            edits,
            dry_run,
            diff,
            json,
        } => cmd_apply(workspace, edits, dry_run, diff, json),

        Commands::Check { workspace, edits } => cmd_apply(workspace, edits, true, false, false),

        Commands::List { workspace } => cmd_list(workspace),
    }
}

/// Per-file entry of the `--json` report.
#[derive(Serialize)]
struct FileReport {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<PatchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ApplyError>,
    /// I/O failures that never reached the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl FileReport {
    fn new(file: &str) -> Self {
        Self {
            file: file.to_string(),
            outcome: None,
            error: None,
            message: None,
        }
    }
}

/// Helper: Discover all .toml edit-set files in an edits/ directory.
///
/// Discovery order:
/// 1. `<workspace>/edits` (allows keeping edit sets alongside the target).
/// 2. `./edits` relative to the current working directory.
fn discover_edit_sets(workspace: &Path) -> Result<Vec<PathBuf>> {
    let cwd_edits_dir = env::current_dir().ok().map(|cwd| cwd.join("edits"));
    let workspace_edits_dir = workspace.join("edits");

    let candidate_dirs: Vec<PathBuf> = std::iter::once(workspace_edits_dir)
        .chain(cwd_edits_dir)
        .collect();

    for edits_dir in candidate_dirs {
        if !edits_dir.exists() {
            continue;
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&edits_dir).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
            {
                files.push(entry.path().to_path_buf());
            }
        }

        files.sort();

        if !files.is_empty() {
            return Ok(files);
        }
    }

    anyhow::bail!(
        "No .toml edit-set files found in either ./edits or {}/edits",
        workspace.display()
    )
}

fn resolve_workspace(cli_workspace: Option<PathBuf>) -> Result<PathBuf> {
    match cli_workspace {
        Some(path) => Ok(path.canonicalize()?),
        None => Ok(env::current_dir()?),
    }
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_apply(
    workspace: Option<PathBuf>,
    edits: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
    json: bool,
) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;

    let edit_files = if let Some(path) = edits {
        vec![path]
    } else {
        discover_edit_sets(&workspace)?
    };

    if !json {
        println!("Workspace: {}", workspace.display());
        if dry_run {
            println!("{}", "[DRY RUN - no files will be modified]".cyan());
        }
        println!();
    }

    let mut reports = Vec::new();
    let mut total_applied = 0;
    let mut total_partial = 0;
    let mut total_failed = 0;

    for edit_file in edit_files {
        if !json {
            println!("Loading edit set from {}...", edit_file.display());
        }

        let set = load_from_path(&edit_file)?;
        let config = set.engine_config();

        for file in set.files() {
            let target = workspace.join(file);
            let original = match fs::read_to_string(&target) {
                Ok(content) => content,
                Err(err) => {
                    total_failed += 1;
                    if json {
                        reports.push(FileReport {
                            message: Some(format!("cannot read: {err}")),
                            ..FileReport::new(file)
                        });
                    } else {
                        eprintln!(
                            "{} {}: cannot read - {}",
                            "✗".red(),
                            target.display(),
                            err
                        );
                    }
                    continue;
                }
            };

            let blocks = set.blocks_for_file(file);
            match apply_blocks(&original, &blocks, &config) {
                Ok(PatchOutcome::Applied(applied)) => {
                    total_applied += 1;
                    if !dry_run {
                        atomic_write(&target, &applied.content)?;
                    }
                    if !json {
                        let verb = if dry_run { "Would apply" } else { "Applied" };
                        println!(
                            "{} {}: {} {} block(s)",
                            "✓".green(),
                            file,
                            verb,
                            applied.reports.len()
                        );
                        for report in &applied.reports {
                            if report.tolerance != Tolerance::Exact {
                                println!(
                                    "  {} block {} matched at tolerance '{}'",
                                    "⚠".yellow(),
                                    report.block_index,
                                    report.tolerance.label()
                                );
                            }
                        }
                        if show_diff {
                            display_diff(&target, &original, &applied.content);
                        }
                    }
                    if json {
                        reports.push(FileReport {
                            outcome: Some(PatchOutcome::Applied(applied)),
                            ..FileReport::new(file)
                        });
                    }
                }
                Ok(outcome @ PatchOutcome::PartiallyApplied { .. }) => {
                    total_partial += 1;
                    if let PatchOutcome::PartiallyApplied { content, outcomes } = &outcome {
                        if !dry_run {
                            atomic_write(&target, content)?;
                        }
                        if !json {
                            println!(
                                "{} {}: batch failed, applied individually",
                                "⊙".yellow(),
                                file
                            );
                            print_block_outcomes(outcomes);
                            if show_diff {
                                display_diff(&target, &original, content);
                            }
                        }
                    }
                    if json {
                        reports.push(FileReport {
                            outcome: Some(outcome),
                            ..FileReport::new(file)
                        });
                    }
                }
                Ok(outcome @ PatchOutcome::FullyFailed { .. }) => {
                    total_failed += 1;
                    if let PatchOutcome::FullyFailed { outcomes } = &outcome {
                        if !json {
                            eprintln!("{} {}: no block could be applied", "✗".red(), file);
                            print_block_outcomes(outcomes);
                        }
                    }
                    if json {
                        reports.push(FileReport {
                            outcome: Some(outcome),
                            ..FileReport::new(file)
                        });
                    }
                }
                Err(err) => {
                    total_failed += 1;
                    if json {
                        reports.push(FileReport {
                            error: Some(err),
                            ..FileReport::new(file)
                        });
                    } else {
                        eprintln!("{} {}: {}", "✗".red(), file, err);
                    }
                }
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!();
        println!(
            "{} applied, {} partial, {} failed",
            total_applied.to_string().green(),
            total_partial.to_string().yellow(),
            total_failed.to_string().red()
        );
    }

    if total_failed > 0 {
        anyhow::bail!("{total_failed} file(s) failed");
    }

    Ok(())
}

fn print_block_outcomes(outcomes: &[BlockOutcome]) {
    for outcome in outcomes {
        match outcome {
            BlockOutcome::Applied {
                block_index,
                tolerance,
            } => {
                println!(
                    "  {} block {} applied ({})",
                    "✓".green(),
                    block_index,
                    tolerance.label()
                );
            }
            BlockOutcome::Failed { block_index, error } => {
                println!("  {} block {} failed: {}", "✗".red(), block_index, error);
            }
        }
    }
}

fn cmd_list(workspace: Option<PathBuf>) -> Result<()> {
    let workspace = resolve_workspace(workspace)?;
    let edit_files = discover_edit_sets(&workspace)?;

    println!("Available edit sets:");
    for edit_file in edit_files {
        match load_from_path(&edit_file) {
            Ok(set) => {
                print_edit_set(&edit_file, &set);
            }
            Err(err) => {
                eprintln!(
                    "  {} {}: {}",
                    "✗".red(),
                    edit_file.display(),
                    err
                );
            }
        }
    }

    Ok(())
}

fn print_edit_set(path: &Path, set: &EditSet) {
    let name = if set.meta.name.is_empty() {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
    } else {
        set.meta.name.as_str()
    };
    println!(
        "  {} ({} edits across {} file(s))",
        name.bold(),
        set.edits.len(),
        set.files().len()
    );
    if let Some(description) = &set.meta.description {
        println!("    {}", description.dimmed());
    }
}
