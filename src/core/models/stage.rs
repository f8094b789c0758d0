//! Pipeline stages
//!
//! A stage names the hook point a run was started from and selects which task
//! list from the configuration is executed.

use serde::{Deserialize, Serialize};

/// Hook point that selects a task list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Fast checks before a commit is recorded
    #[default]
    PreCommit,
    /// Heavier checks before pushing
    PrePush,
    /// Everything configured for either hook
    Ci,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreCommit => write!(f, "pre-commit"),
            Self::PrePush => write!(f, "pre-push"),
            Self::Ci => write!(f, "ci"),
        }
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pre-commit" | "precommit" => Ok(Self::PreCommit),
            "pre-push" | "prepush" => Ok(Self::PrePush),
            "ci" => Ok(Self::Ci),
            _ => Err(format!("Invalid stage: {s}. Use: pre-commit, pre-push, ci")),
        }
    }
}
