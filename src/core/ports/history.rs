//! Version control history port
//!
//! Defines what the culprit scorer needs to know about recent history.

use crate::core::models::Commit;

/// Read-only view of the repository history
///
/// Every method degrades instead of failing: a missing repository, ref or
/// commit yields an empty result so a run can still report task outcomes
/// without attribution.
pub trait CommitHistory: Send + Sync {
    /// Reference that "commits since" is measured from
    ///
    /// The current branch's upstream, else a local `main`, else `master`
    /// (returned even when it does not exist).
    fn resolve_base_ref(&self) -> String;

    /// Commits reachable from HEAD but not from `base_ref`, newest first
    fn commits_since(&self, base_ref: &str) -> Vec<Commit>;

    /// Paths touched by a single commit, generated/vendored paths excluded
    fn changed_files(&self, sha: &str) -> Vec<String>;

    /// Short name of the checked-out branch, `None` when detached
    fn current_branch(&self) -> Option<String>;
}
