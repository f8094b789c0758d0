//! Temporary git repository helper for integration tests

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A temporary git repository for testing
///
/// The repository starts on a `main` branch with one root commit, so later
/// commits can be listed relative to `main`.
pub struct TempGitRepo {
    _temp_dir: TempDir,
    path: PathBuf,
    clock: std::cell::Cell<i64>,
}

impl TempGitRepo {
    /// Create a new temporary git repository with a root commit on `main`
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().to_path_buf();

        let repo = Self {
            _temp_dir: temp_dir,
            path,
            clock: std::cell::Cell::new(1_700_000_000),
        };

        repo.git(&["init", "-q"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);

        repo.write_file("README.md", "# fixture\n");
        repo.commit_all("Initial commit", "Test User");
        repo
    }

    /// Get the path to the repository
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a file to the repository
    pub fn write_file(&self, name: &str, content: &str) {
        let file_path = self.path.join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(file_path, content).expect("Failed to write file");
    }

    /// Switch to a new branch
    pub fn branch(&self, name: &str) {
        self.git(&["checkout", "-q", "-b", name]);
    }

    /// Stage everything and commit as `author`
    ///
    /// Each commit is dated one minute after the previous one.
    pub fn commit_all(&self, message: &str, author: &str) -> String {
        let when = self.clock.get() + 60;
        self.clock.set(when);
        let date = format!("@{when} +0000");
        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));

        self.git(&["add", "-A"]);
        let output = Command::new("git")
            .args(["commit", "-q", "--allow-empty", "-m", message])
            .env("GIT_AUTHOR_NAME", author)
            .env("GIT_AUTHOR_EMAIL", &email)
            .env("GIT_AUTHOR_DATE", &date)
            .env("GIT_COMMITTER_DATE", &date)
            .current_dir(&self.path)
            .output()
            .expect("Failed to commit");
        assert!(output.status.success(), "commit failed: {}", String::from_utf8_lossy(&output.stderr));

        self.head()
    }

    /// Full hash of HEAD
    pub fn head(&self) -> String {
        let output = self.git(&["rev-parse", "HEAD"]);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Run a git command and return output
    pub fn git(&self, args: &[&str]) -> std::process::Output {
        Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .expect("Failed to run git command")
    }
}

impl Default for TempGitRepo {
    fn default() -> Self {
        Self::new()
    }
}
