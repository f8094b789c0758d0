//! Commits and their attribution scores

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Length of the abbreviated hash carried by [`Commit::sha`]
pub const SHORT_SHA_LEN: usize = 8;

/// A commit on the current branch that is not on the base ref
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    /// First eight characters of the full hash
    pub sha: String,
    /// Author name
    pub author: String,
    /// Author email
    pub email: String,
    /// Subject line of the commit message
    pub message: String,
    /// Commit timestamp
    pub date: DateTime<Utc>,
}

impl Commit {
    /// Build a commit from its full hash, abbreviating it
    #[must_use]
    pub fn new(
        full_sha: &str,
        author: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            sha: short_sha(full_sha),
            author: author.into(),
            email: email.into(),
            message: message.into(),
            date,
        }
    }
}

/// Abbreviate a hash to [`SHORT_SHA_LEN`] characters
#[must_use]
pub fn short_sha(full_sha: &str) -> String {
    full_sha.chars().take(SHORT_SHA_LEN).collect()
}

/// A commit with its overlap score against the failing files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredCommit {
    /// The commit
    pub commit: Commit,
    /// Number of failing files the commit touched
    pub score: usize,
}
