//! Culprit scorer - ranks branch commits by overlap with failing files
//!
//! A commit's score is the number of failing files that share a substring
//! relationship (either direction) with at least one file the commit touched.
//! Containment rather than equality tolerates the different path forms tools
//! and git report (`/abs/repo/src/a.ts` vs `src/a.ts`), at the cost of false
//! positives on short common names like `index.ts`.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;
use tokio::sync::Semaphore;

use crate::core::models::{Commit, ScoredCommit};
use crate::core::ports::CommitHistory;

/// Maximum number of suspects returned
pub const MAX_SUSPECTS: usize = 3;

/// Default bound on concurrent changed-file lookups
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Count failing files that overlap any changed file
#[must_use]
pub fn overlap_score(failing_files: &BTreeSet<String>, changed_files: &[String]) -> usize {
    failing_files
        .iter()
        .filter(|f| changed_files.iter().any(|c| f.contains(c.as_str()) || c.contains(f.as_str())))
        .count()
}

/// Order scored commits: score descending, then newest first, keep positives, cap
///
/// The sort is stable, so commits with equal score and date keep history order.
#[must_use]
pub fn rank(mut scored: Vec<ScoredCommit>) -> Vec<ScoredCommit> {
    scored.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| b.commit.date.cmp(&a.commit.date)));
    scored.into_iter().filter(|s| s.score > 0).take(MAX_SUSPECTS).collect()
}

/// Ranks commits since the base ref against a set of failing files
#[derive(Clone)]
pub struct CulpritScorer {
    history: Arc<dyn CommitHistory>,
    max_concurrent_lookups: usize,
}

impl CulpritScorer {
    /// Create a scorer over a history provider
    #[must_use]
    pub fn new(history: Arc<dyn CommitHistory>) -> Self {
        Self {
            history,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }

    /// Bound the number of changed-file lookups in flight (minimum 1)
    #[must_use]
    pub fn with_max_concurrent_lookups(mut self, limit: usize) -> Self {
        self.max_concurrent_lookups = limit.max(1);
        self
    }

    /// Top suspects with their scores
    ///
    /// Returns nothing, without touching history, when `failing_files` is empty.
    pub async fn rank(&self, failing_files: &BTreeSet<String>) -> Vec<ScoredCommit> {
        if failing_files.is_empty() {
            return Vec::new();
        }

        let history = Arc::clone(&self.history);
        let lookup = tokio::task::spawn_blocking(move || {
            let base = history.resolve_base_ref();
            let commits = history.commits_since(&base);
            (base, commits)
        });
        let (base, commits) = match lookup.await {
            Ok(found) => found,
            Err(e) => {
                debug!("commit listing failed: {e}");
                return Vec::new();
            },
        };
        debug!("{} commit(s) since {base}", commits.len());
        if commits.is_empty() {
            return Vec::new();
        }

        let changed = self.changed_files_for(&commits).await;
        let scored = commits
            .into_iter()
            .zip(changed)
            .map(|(commit, files)| ScoredCommit {
                score: overlap_score(failing_files, &files),
                commit,
            })
            .collect();

        rank(scored)
    }

    /// Top suspects, most likely first
    pub async fn find_likely_culprits(&self, failing_files: &BTreeSet<String>) -> Vec<Commit> {
        self.rank(failing_files).await.into_iter().map(|s| s.commit).collect()
    }

    /// Fetch changed files for every commit, at most `max_concurrent_lookups` at a time
    ///
    /// The result is index-aligned with `commits`. A lookup whose task fails
    /// counts as touching nothing.
    async fn changed_files_for(&self, commits: &[Commit]) -> Vec<Vec<String>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_lookups));
        let mut handles = Vec::with_capacity(commits.len());

        for commit in commits {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                handles.push(None);
                continue;
            };
            let history = Arc::clone(&self.history);
            let sha = commit.sha.clone();
            handles.push(Some(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                history.changed_files(&sha)
            })));
        }

        let mut changed = Vec::with_capacity(handles.len());
        for handle in handles {
            let files = match handle {
                Some(handle) => handle.await.unwrap_or_else(|e| {
                    debug!("changed-file lookup failed: {e}");
                    Vec::new()
                }),
                None => Vec::new(),
            };
            changed.push(files);
        }
        changed
    }
}

impl std::fmt::Debug for CulpritScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CulpritScorer")
            .field("max_concurrent_lookups", &self.max_concurrent_lookups)
            .finish_non_exhaustive()
    }
}
