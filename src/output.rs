//! Output formatting for human and JSON modes
//!
//! This module provides the run report that can be rendered either as
//! human-readable text or machine-parseable JSON.

use std::fmt::Write as _;

use colored::Colorize;
use serde::Serialize;

use crate::core::models::{ScoredCommit, Stage, TaskResult, TaskStatus};
use crate::core::services::PipelineReport;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Result of a `test` run
#[derive(Debug, Serialize)]
pub struct TestReport {
    /// Whether every task passed
    pub passed: bool,
    /// Stage the run was started for
    pub stage: Stage,
    /// Whether the run was cancelled
    pub cancelled: bool,
    /// One entry per task, in execution order
    pub tasks: Vec<TaskLine>,
    /// Requested tasks that are not registered
    pub unknown_tasks: Vec<String>,
    /// Union of failing files across failed tasks
    pub failing_files: Vec<String>,
    /// Ranked suspects, most likely first
    pub suspects: Vec<SuspectLine>,
}

/// A task in the report
#[derive(Debug, Serialize)]
pub struct TaskLine {
    /// Task name
    pub name: String,
    /// How the task ended
    pub status: TaskStatus,
    /// One-line failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Files implicated by this task's failure
    pub failing_files: Vec<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// A suspect commit in the report
#[derive(Debug, Serialize)]
pub struct SuspectLine {
    /// Abbreviated hash
    pub sha: String,
    /// Subject line
    pub message: String,
    /// Author name
    pub author: String,
    /// Author email
    pub email: String,
    /// Overlap score
    pub score: usize,
}

impl From<&TaskResult> for TaskLine {
    fn from(result: &TaskResult) -> Self {
        Self {
            name: result.name.clone(),
            status: result.status,
            error: if result.failed() { result.error_detail() } else { None },
            failing_files: result.failing_files.iter().cloned().collect(),
            duration_ms: result.duration_ms,
        }
    }
}

impl From<&ScoredCommit> for SuspectLine {
    fn from(scored: &ScoredCommit) -> Self {
        Self {
            sha: scored.commit.sha.clone(),
            message: scored.commit.message.clone(),
            author: scored.commit.author.clone(),
            email: scored.commit.email.clone(),
            score: scored.score,
        }
    }
}

impl TestReport {
    /// Assemble the report from a pipeline run and its ranked suspects
    #[must_use]
    pub fn new(stage: Stage, report: &PipelineReport, suspects: &[ScoredCommit]) -> Self {
        Self {
            passed: report.success(),
            stage,
            cancelled: report.cancelled,
            tasks: report.results.iter().map(TaskLine::from).collect(),
            unknown_tasks: report.unknown.clone(),
            failing_files: report.failing_files().into_iter().collect(),
            suspects: suspects.iter().map(SuspectLine::from).collect(),
        }
    }

    /// Whether any task failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.tasks.iter().any(|t| t.status == TaskStatus::Failed)
    }

    /// Render the result based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => print!("{}", self.to_human()),
            OutputMode::Json => self.render_json(),
        }
    }

    /// The human-readable report text
    #[must_use]
    pub fn to_human(&self) -> String {
        let mut out = String::new();

        if self.tasks.is_empty() {
            let _ = writeln!(out, "No tasks to run for {}.", self.stage);
            return out;
        }

        for task in &self.tasks {
            match task.status {
                TaskStatus::Passed => {
                    let _ = writeln!(out, "{}", format!("✅ {}", task.name).green());
                },
                TaskStatus::Failed => {
                    let _ = writeln!(out, "{}", format!("❌ {}", task.name).red());
                    if let Some(error) = &task.error {
                        let _ = writeln!(out, "   {}", error.dimmed());
                    }
                },
                TaskStatus::NotRun => {
                    let _ = writeln!(out, "{}", format!("⏭ {} (not run)", task.name).yellow());
                },
            }
        }

        if self.cancelled {
            let _ = writeln!(out, "\nRun cancelled.");
        }

        if self.has_failures() {
            let _ = writeln!(out, "\n{}", "Likely suspects:".bold());
            if self.suspects.is_empty() {
                let _ = writeln!(out, "  (none found)");
            }
            for s in &self.suspects {
                let _ = writeln!(out, "  {} {} — {}", s.sha.yellow(), s.message, s.author);
            }
        }

        out
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}
