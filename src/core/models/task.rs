//! Task results and run options
//!
//! A task is one named check (lint, typecheck, build, ...). Each pipeline run
//! produces exactly one [`TaskResult`] per requested task.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// How a task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// The check exited successfully
    Passed,
    /// The check failed, timed out, or could not be started
    Failed,
    /// The run was cancelled before this task finished
    NotRun,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::NotRun => write!(f, "not run"),
        }
    }
}

/// Outcome of one task in one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    /// Task name as registered
    pub name: String,
    /// How the task ended
    pub status: TaskStatus,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Files implicated by the failure output (empty unless failed)
    pub failing_files: BTreeSet<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

impl TaskResult {
    /// Result for a task that never ran because the pipeline was cancelled
    #[must_use]
    pub const fn not_run(name: String) -> Self {
        Self {
            name,
            status: TaskStatus::NotRun,
            stdout: String::new(),
            stderr: String::new(),
            failing_files: BTreeSet::new(),
            duration_ms: 0,
        }
    }

    /// Whether the task passed
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == TaskStatus::Passed
    }

    /// Whether the task ran and failed
    #[must_use]
    pub fn failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    /// One-line description of the failure for the report
    ///
    /// First non-empty line of stderr, falling back to stdout, truncated to
    /// 200 characters.
    #[must_use]
    pub fn error_detail(&self) -> Option<String> {
        const MAX_DETAIL: usize = 200;

        let first_line = |text: &str| {
            text.lines().map(str::trim).find(|l| !l.is_empty()).map(ToString::to_string)
        };

        first_line(&self.stderr).or_else(|| first_line(&self.stdout)).map(|line| {
            if line.chars().count() > MAX_DETAIL {
                let cut: String = line.chars().take(MAX_DETAIL).collect();
                format!("{cut}...")
            } else {
                line
            }
        })
    }
}

/// Options shared by every command a pipeline launches
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Working directory (current directory when `None`)
    pub cwd: Option<PathBuf>,
    /// Suppress echoing the command and its live output
    pub silent: bool,
    /// Kill the command after this long
    pub timeout: Option<Duration>,
    /// Cancelling this token kills the running command
    pub cancel: CancellationToken,
}

impl RunOptions {
    /// Copy of these options with a different timeout
    #[must_use]
    pub fn with_timeout(&self, timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }
}
