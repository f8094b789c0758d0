//! Integration tests for the p5 CLI
//!
//! These tests run the binary against temporary repositories whose tasks are
//! small shell scripts, covering the full cycle of: run tasks → extract
//! failing files → rank suspects → report → exit code.

#[path = "../common/mod.rs"]
#[allow(dead_code)]
mod common;

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use common::git_repo::TempGitRepo;

const FAILING_CONFIG: &str = r#"
[tests]
pre_push = ["lint", "typecheck", "build"]

[tasks.lint]
command = ["sh", "-c", "echo 'src/a.ts:1:1: no-unused-vars' >&2; exit 1"]

[tasks.typecheck]
command = ["sh", "-c", "exit 0"]

[tasks.build]
command = ["sh", "-c", "echo 'Failed to compile src/b.ts'; exit 1"]
"#;

const PASSING_CONFIG: &str = r#"
[tests]
pre_commit = ["lint", "missing"]

[tasks.lint]
command = ["sh", "-c", "echo linted"]
"#;

/// Helper function to create a p5 command
fn p5(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(cargo::cargo_bin!("p5"));
    cmd.current_dir(dir).env("CLICOLOR", "0").env("NO_COLOR", "1");
    cmd
}

/// Repository on a feature branch: `x` touches a.ts, `y` touches a.ts and b.ts
fn broken_branch() -> TempGitRepo {
    let repo = TempGitRepo::new();
    repo.write_file("p5.toml", FAILING_CONFIG);
    repo.commit_all("add p5 config", "Test User");
    repo.branch("feature");

    repo.write_file("src/a.ts", "let unused = 1;\n");
    repo.commit_all("x: add a", "Xavier");
    repo.write_file("src/a.ts", "let unused = 2;\n");
    repo.write_file("src/b.ts", "broken(\n");
    repo.commit_all("y: touch a and b", "Yara");
    repo.write_file("docs/guide.md", "docs\n");
    repo.commit_all("z: docs only", "Zed");
    repo
}

// =============================================================================
// Reporting
// =============================================================================

#[test]
fn test_failing_stage_reports_in_order_with_suspects() {
    let repo = broken_branch();

    let output = p5(repo.path()).args(["test", "pre-push", "--quiet"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);

    let lint = stdout.find("❌ lint").expect("lint line");
    let typecheck = stdout.find("✅ typecheck").expect("typecheck line");
    let build = stdout.find("❌ build").expect("build line");
    assert!(lint < typecheck && typecheck < build);
    assert!(stdout.contains("no-unused-vars"));

    let suspects = stdout.find("Likely suspects:").expect("suspects block");
    let y = stdout.find("y: touch a and b — Yara").expect("y listed");
    let x = stdout.find("x: add a — Xavier").expect("x listed");
    assert!(suspects < y && y < x);
    assert!(!stdout.contains("z: docs only"));
}

#[test]
fn test_json_report() {
    let repo = broken_branch();

    let output = p5(repo.path()).args(["--json", "test", "pre-push"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(report["passed"], false);
    assert_eq!(report["stage"], "pre-push");
    assert_eq!(report["tasks"].as_array().unwrap().len(), 3);
    assert_eq!(report["failing_files"], serde_json::json!(["src/a.ts", "src/b.ts"]));
    assert_eq!(report["suspects"][0]["message"], "y: touch a and b");
    assert_eq!(report["suspects"][0]["score"], 2);
    assert_eq!(report["suspects"][1]["score"], 1);
}

#[test]
fn test_passing_stage_exits_zero() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("p5.toml"), PASSING_CONFIG).unwrap();

    p5(temp.path())
        .args(["test", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ lint"))
        .stdout(predicate::str::contains("Likely suspects").not())
        .stderr(predicate::str::contains("Unknown task 'missing'"));
}

#[test]
fn test_all_runs_every_registered_task_in_order() {
    let temp = TempDir::new().unwrap();
    let config = r#"
[tests]
pre_commit = ["lint"]

[tasks.lint]
command = ["sh", "-c", "echo lint >> ran.log"]

[tasks.typecheck]
command = ["sh", "-c", "echo typecheck >> ran.log"]

[tasks.build]
command = ["sh", "-c", "echo build >> ran.log"]

[tasks.test]
command = ["sh", "-c", "echo test >> ran.log"]

[tasks.e2e]
command = ["sh", "-c", "echo e2e >> ran.log"]
"#;
    fs::write(temp.path().join("p5.toml"), config).unwrap();

    p5(temp.path())
        .args(["test", "--all", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ e2e"));

    let ran = fs::read_to_string(temp.path().join("ran.log")).unwrap();
    assert_eq!(ran.lines().collect::<Vec<_>>(), vec!["lint", "typecheck", "build", "test", "e2e"]);
}

#[test]
fn test_streams_output_unless_quiet() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("p5.toml"), PASSING_CONFIG).unwrap();

    p5(temp.path())
        .arg("test")
        .assert()
        .success()
        .stdout(predicate::str::contains("$ sh -c 'echo linted'"))
        .stdout(predicate::str::contains("linted"));
}

#[test]
fn test_failure_outside_repository_has_no_suspects() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("p5.toml"), FAILING_CONFIG).unwrap();

    p5(temp.path())
        .args(["test", "pre-push", "-q"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("❌ build"))
        .stdout(predicate::str::contains("(none found)"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_invalid_config_is_an_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("p5.toml"), "[notifications]\nprovider = \"pager\"\n").unwrap();

    p5(temp.path())
        .arg("test")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("p5.toml"));
}

#[test]
fn test_invalid_stage_is_an_error() {
    let temp = TempDir::new().unwrap();

    p5(temp.path())
        .args(["test", "deploy"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid stage: deploy"));
}

#[test]
fn test_version() {
    let temp = TempDir::new().unwrap();

    p5(temp.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("p5 v{}", env!("CARGO_PKG_VERSION"))));
}
