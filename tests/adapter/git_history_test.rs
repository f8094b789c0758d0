//! `GitHistory` against temporary repositories

use std::collections::BTreeSet;
use std::sync::Arc;

use p5::adapters::GitHistory;
use p5::adapters::git::{DEFAULT_BASE, FALLBACK_BASE};
use p5::core::models::SHORT_SHA_LEN;
use p5::core::ports::CommitHistory;
use p5::core::services::CulpritScorer;
use tempfile::TempDir;

use crate::common::git_repo::TempGitRepo;

fn history(repo: &TempGitRepo) -> GitHistory {
    GitHistory::new(repo.path().to_path_buf())
}

#[test]
fn test_base_ref_defaults_to_main() {
    let repo = TempGitRepo::new();
    repo.branch("feature");

    assert_eq!(history(&repo).resolve_base_ref(), DEFAULT_BASE);
}

#[test]
fn test_base_ref_prefers_upstream() {
    let repo = TempGitRepo::new();
    repo.git(&["remote", "add", "origin", "https://git.example/fixture.git"]);
    repo.git(&["update-ref", "refs/remotes/origin/main", "HEAD"]);
    repo.branch("feature");
    let out = repo.git(&["branch", "--set-upstream-to=origin/main"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    repo.write_file("src/a.ts", "a");
    repo.commit_all("feature work", "Ada");

    let history = history(&repo);
    let base = history.resolve_base_ref();
    assert_eq!(base, "origin/main");

    let messages: Vec<String> = history.commits_since(&base).into_iter().map(|c| c.message).collect();
    assert_eq!(messages, vec!["feature work"]);
}

#[test]
fn test_base_ref_falls_back_to_master() {
    let repo = TempGitRepo::new();
    repo.git(&["branch", "-m", "main", "trunk"]);

    assert_eq!(history(&repo).resolve_base_ref(), FALLBACK_BASE);
}

#[test]
fn test_commits_since_newest_first() {
    let repo = TempGitRepo::new();
    repo.branch("feature");
    repo.write_file("src/a.ts", "a");
    repo.commit_all("add a", "Ada");
    repo.write_file("src/b.ts", "b");
    repo.commit_all("add b", "Bob");

    let commits = history(&repo).commits_since("main");

    let messages: Vec<&str> = commits.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["add b", "add a"]);
    assert_eq!(commits[0].author, "Bob");
    assert_eq!(commits[0].email, "bob@example.com");
    assert!(commits[0].date > commits[1].date);
}

#[test]
fn test_commit_sha_is_prefix_of_full_hash() {
    let repo = TempGitRepo::new();
    repo.branch("feature");
    repo.write_file("src/a.ts", "a");
    let full = repo.commit_all("add a", "Ada");

    let commits = history(&repo).commits_since("main");

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].sha.len(), SHORT_SHA_LEN);
    assert!(full.starts_with(&commits[0].sha));
}

#[test]
fn test_unknown_base_yields_no_commits() {
    let repo = TempGitRepo::new();

    assert!(history(&repo).commits_since("does-not-exist").is_empty());
}

#[test]
fn test_changed_files_skip_generated_dirs() {
    let repo = TempGitRepo::new();
    repo.write_file("src/app.ts", "x");
    repo.write_file("node_modules/lib/index.js", "y");
    repo.write_file("dist/app.js", "z");
    let sha = repo.commit_all("touch things", "Ada");

    let files = history(&repo).changed_files(&sha);

    assert_eq!(files, vec!["src/app.ts"]);
}

#[test]
fn test_changed_files_of_root_commit() {
    let repo = TempGitRepo::new();
    let root = String::from_utf8_lossy(&repo.git(&["rev-list", "--max-parents=0", "HEAD"]).stdout)
        .trim()
        .to_string();

    assert_eq!(history(&repo).changed_files(&root), vec!["README.md"]);
}

#[test]
fn test_current_branch() {
    let repo = TempGitRepo::new();
    repo.branch("feature/login");

    assert_eq!(history(&repo).current_branch().as_deref(), Some("feature/login"));
}

#[test]
fn test_outside_repository_degrades() {
    let temp = TempDir::new().unwrap();
    let history = GitHistory::new(temp.path().to_path_buf());

    assert_eq!(history.resolve_base_ref(), FALLBACK_BASE);
    assert!(history.commits_since("main").is_empty());
    assert!(history.changed_files("HEAD").is_empty());
    assert_eq!(history.current_branch(), None);
}

#[tokio::test]
async fn test_ranks_suspects_from_real_history() {
    let repo = TempGitRepo::new();
    repo.branch("feature");
    repo.write_file("src/a.ts", "a");
    repo.commit_all("x: touch a", "Xavier");
    repo.write_file("src/a.ts", "a2");
    repo.write_file("src/b.ts", "b");
    repo.commit_all("y: touch a and b", "Yara");
    repo.write_file("docs/guide.md", "c");
    repo.commit_all("z: docs", "Zed");

    let history: Arc<dyn CommitHistory> = Arc::new(history(&repo));
    let failing: BTreeSet<String> = ["src/a.ts", "src/b.ts"].iter().map(ToString::to_string).collect();

    let suspects = CulpritScorer::new(history).find_likely_culprits(&failing).await;

    let messages: Vec<&str> = suspects.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["y: touch a and b", "x: touch a"]);
}
