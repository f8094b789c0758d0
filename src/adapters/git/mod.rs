//! Git integration adapter
//!
//! Implements [`CommitHistory`] on top of libgit2. Every lookup opens the
//! repository afresh, so the adapter is `Send + Sync` and lookups can run on
//! separate blocking threads.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::{BranchType, Repository, Sort};
use log::debug;

use crate::core::models::Commit;
use crate::core::ports::CommitHistory;
use crate::core::services::is_generated_path;

/// Base ref tried when the branch has no upstream
pub const DEFAULT_BASE: &str = "main";

/// Base ref returned when nothing else resolves
pub const FALLBACK_BASE: &str = "master";

/// Git-backed commit history
#[derive(Debug, Clone)]
pub struct GitHistory {
    /// Directory the repository is discovered from
    workdir: PathBuf,
}

impl GitHistory {
    /// Create a history provider for the repository containing `workdir`
    #[must_use]
    pub const fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    fn open(&self) -> Result<Repository, git2::Error> {
        Repository::discover(&self.workdir)
    }

    fn try_commits_since(&self, base_ref: &str) -> Result<Vec<Commit>, git2::Error> {
        let repo = self.open()?;
        let base = repo.revparse_single(base_ref)?.peel_to_commit()?;

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_head()?;
        revwalk.hide(base.id())?;

        revwalk
            .map(|oid| {
                let commit = repo.find_commit(oid?)?;
                Ok(to_commit(&commit))
            })
            .collect()
    }

    fn try_changed_files(&self, sha: &str) -> Result<Vec<String>, git2::Error> {
        let repo = self.open()?;
        let commit = repo.revparse_single(sha)?.peel_to_commit()?;
        let tree = commit.tree()?;
        // Root commits are diffed against the empty tree
        let parent_tree = commit.parent(0).ok().map(|p| p.tree()).transpose()?;

        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files: Vec<String> = Vec::new();
        for delta in diff.deltas() {
            let path = delta.new_file().path().or_else(|| delta.old_file().path());
            if let Some(path) = path.and_then(Path::to_str)
                && !is_generated_path(path)
                && !files.iter().any(|f| f == path)
            {
                files.push(path.to_string());
            }
        }
        Ok(files)
    }
}

impl CommitHistory for GitHistory {
    fn resolve_base_ref(&self) -> String {
        let repo = match self.open() {
            Ok(repo) => repo,
            Err(e) => {
                debug!("No repository at {}: {}", self.workdir.display(), e.message());
                return FALLBACK_BASE.to_string();
            },
        };

        match upstream_of_head(&repo) {
            Ok(upstream) => return upstream,
            Err(e) => debug!("No upstream for HEAD: {}", e.message()),
        }

        if repo.find_branch(DEFAULT_BASE, BranchType::Local).is_ok() {
            DEFAULT_BASE.to_string()
        } else {
            FALLBACK_BASE.to_string()
        }
    }

    fn commits_since(&self, base_ref: &str) -> Vec<Commit> {
        self.try_commits_since(base_ref).unwrap_or_else(|e| {
            debug!("Cannot list commits since {base_ref}: {}", e.message());
            Vec::new()
        })
    }

    fn changed_files(&self, sha: &str) -> Vec<String> {
        self.try_changed_files(sha).unwrap_or_else(|e| {
            debug!("Cannot list files changed by {sha}: {}", e.message());
            Vec::new()
        })
    }

    fn current_branch(&self) -> Option<String> {
        let repo = self.open().ok()?;
        let head = repo.head().ok()?;
        if !head.is_branch() {
            return None; // Detached HEAD
        }
        head.shorthand().map(ToString::to_string)
    }
}

/// Name of the upstream tracking branch of the checked-out branch
fn upstream_of_head(repo: &Repository) -> Result<String, git2::Error> {
    let head = repo.head()?;
    if !head.is_branch() {
        return Err(git2::Error::from_str("HEAD is detached"));
    }
    let name = head
        .shorthand()
        .ok_or_else(|| git2::Error::from_str("branch name is not valid UTF-8"))?;
    let upstream = repo.find_branch(name, BranchType::Local)?.upstream()?;
    upstream
        .name()?
        .map(ToString::to_string)
        .ok_or_else(|| git2::Error::from_str("upstream name is not valid UTF-8"))
}

fn to_commit(commit: &git2::Commit<'_>) -> Commit {
    let author = commit.author();
    let date = DateTime::<Utc>::from_timestamp(author.when().seconds(), 0).unwrap_or_default();
    Commit::new(
        &commit.id().to_string(),
        author.name().unwrap_or("unknown"),
        author.email().unwrap_or(""),
        commit.summary().unwrap_or(""),
        date,
    )
}
