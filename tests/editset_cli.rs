//! End-to-end workflow test through the edit-set loader and the CLI binary.
//!
//! 1. Build a workspace in a tempdir
//! 2. Apply an edit set
//! 3. Verify the target file and the exit code
//! 4. Check dry-run and JSON modes

use std::fs;
use std::process::Command;
use tempfile::TempDir;

const SOURCE: &str = "fn greet() {\n    println!(\"hello\");\n}\n";

const EDIT_SET: &str = r#"
[meta]
name = "greet-world"
description = "swap the greeting"

[[edits]]
file = "src/greet.rs"
search = """
    println!("hello");
"""
replace = """
    println!("world");
"""
"#;

/// Create a workspace with one source file and one edit set.
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::create_dir_all(dir.path().join("edits")).unwrap();
    fs::write(dir.path().join("src/greet.rs"), SOURCE).unwrap();
    fs::write(dir.path().join("edits/greet.toml"), EDIT_SET).unwrap();
    dir
}

fn blockpatch() -> Command {
    Command::new(env!("CARGO_BIN_EXE_blockpatch"))
}

#[test]
fn apply_rewrites_the_target_file() {
    let dir = setup_workspace();

    let output = blockpatch()
        .args(["apply", "--workspace"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let patched = fs::read_to_string(dir.path().join("src/greet.rs")).unwrap();
    assert_eq!(patched, "fn greet() {\n    println!(\"world\");\n}\n");
}

#[test]
fn dry_run_leaves_the_file_untouched() {
    let dir = setup_workspace();

    let output = blockpatch()
        .args(["apply", "--dry-run", "--workspace"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let content = fs::read_to_string(dir.path().join("src/greet.rs")).unwrap();
    assert_eq!(content, SOURCE);
}

#[test]
fn check_reports_would_apply() {
    let dir = setup_workspace();

    let output = blockpatch()
        .args(["check", "--workspace"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Would apply"));
}

#[test]
fn json_report_is_parseable_and_tagged() {
    let dir = setup_workspace();

    let output = blockpatch()
        .args(["apply", "--json", "--workspace"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON report");
    assert_eq!(report[0]["file"], "src/greet.rs");
    assert_eq!(report[0]["outcome"]["state"], "applied");
}

#[test]
fn failing_edit_set_exits_nonzero_with_diagnostic() {
    let dir = setup_workspace();
    fs::write(
        dir.path().join("edits/greet.toml"),
        r#"
[[edits]]
file = "src/greet.rs"
search = "println!(\"goodbye\");"
replace = "println!(\"farewell\");"
"#,
    )
    .unwrap();

    let output = blockpatch()
        .args(["apply", "--workspace"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    // The near-miss diagnostic points at the closest real line.
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stdout.contains("hello") || stderr.contains("hello"),
        "diagnostic should quote the closest region"
    );
    // Nothing was written.
    let content = fs::read_to_string(dir.path().join("src/greet.rs")).unwrap();
    assert_eq!(content, SOURCE);
}

#[test]
fn list_names_edit_sets() {
    let dir = setup_workspace();

    let output = blockpatch()
        .args(["list", "--workspace"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("greet-world"));
    assert!(stdout.contains("swap the greeting"));
}

#[test]
fn invalid_edit_set_is_rejected_before_any_write() {
    let dir = setup_workspace();
    fs::write(dir.path().join("edits/greet.toml"), "[meta]\nname = \"empty\"\n").unwrap();

    let output = blockpatch()
        .args(["apply", "--workspace"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = fs::read_to_string(dir.path().join("src/greet.rs")).unwrap();
    assert_eq!(content, SOURCE);
}
