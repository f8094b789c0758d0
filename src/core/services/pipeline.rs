//! Task pipeline - runs the selected checks in order and collects results
//!
//! Tasks run one at a time in the order requested. A failing task never stops
//! the run: every requested task is attempted so the report is complete.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use super::extractor::FailurePatterns;
use crate::core::models::{ProcessOutput, RunOptions, TaskResult, TaskStatus};
use crate::core::ports::TaskStrategy;

/// Immutable mapping of task name to execution strategy
///
/// Built once at startup and handed to the [`Pipeline`]. Registration order is
/// preserved and is the order `--all` runs in.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: Vec<(String, Arc<dyn TaskStrategy>)>,
}

impl TaskRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task, replacing any existing task with the same name in place
    #[must_use]
    pub fn with_task(mut self, name: impl Into<String>, strategy: Arc<dyn TaskStrategy>) -> Self {
        let name = name.into();
        if let Some(slot) = self.tasks.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = strategy;
        } else {
            self.tasks.push((name, strategy));
        }
        self
    }

    /// Look up a task's strategy
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn TaskStrategy>> {
        self.tasks.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Whether a task is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All task names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.tasks.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Number of registered tasks
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.tasks.iter().map(|(n, s)| (n, s.describe()))).finish()
    }
}

/// Everything one pipeline run produced
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// One result per known task, in execution order
    pub results: Vec<TaskResult>,
    /// Requested names that were not in the registry
    pub unknown: Vec<String>,
    /// Whether the run was cancelled before it finished
    pub cancelled: bool,
}

impl PipelineReport {
    /// Whether every task ran and passed
    #[must_use]
    pub fn success(&self) -> bool {
        self.results.iter().all(TaskResult::success)
    }

    /// Exit code for the enclosing command
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.success())
    }

    /// Tasks that ran and failed
    pub fn failed(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|r| r.failed())
    }

    /// Number of tasks that failed
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// Union of the failing files of every failed task
    #[must_use]
    pub fn failing_files(&self) -> BTreeSet<String> {
        self.failed().flat_map(|r| r.failing_files.iter().cloned()).collect()
    }
}

/// Sequential, fail-open task runner
#[derive(Debug)]
pub struct Pipeline {
    registry: TaskRegistry,
    patterns: FailurePatterns,
    options: RunOptions,
}

impl Pipeline {
    /// Create a pipeline over a registry with the built-in failure patterns
    #[must_use]
    pub fn new(registry: TaskRegistry, options: RunOptions) -> Self {
        Self {
            registry,
            patterns: FailurePatterns::builtin(),
            options,
        }
    }

    /// Use a different extraction rule chain
    #[must_use]
    pub fn with_patterns(mut self, patterns: FailurePatterns) -> Self {
        self.patterns = patterns;
        self
    }

    /// Run the named tasks in order
    ///
    /// Unknown names are skipped with a warning. Once the cancellation token
    /// fires, the interrupted task and everything after it are recorded as
    /// not run.
    pub async fn run_tasks(&self, names: &[String]) -> PipelineReport {
        info!("Running {} task(s)", names.len());
        let mut report = PipelineReport::default();

        for name in names {
            let Some(strategy) = self.registry.get(name) else {
                warn!("Unknown task '{name}', skipping");
                report.unknown.push(name.clone());
                continue;
            };

            if self.options.cancel.is_cancelled() {
                report.cancelled = true;
                report.results.push(TaskResult::not_run(name.clone()));
                continue;
            }

            debug!("Task {name}: {}", strategy.describe());
            let start = Instant::now();
            let output = strategy.execute(&self.options).await;
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            let result = self.to_result(name, output, duration_ms);
            if result.status == TaskStatus::NotRun {
                report.cancelled = true;
            }
            debug!("Task {name} {} in {duration_ms}ms", result.status);
            report.results.push(result);
        }

        info!(
            "Pipeline finished: {} of {} task(s) failed",
            report.failed_count(),
            report.results.len()
        );
        report
    }

    fn to_result(&self, name: &str, output: ProcessOutput, duration_ms: u64) -> TaskResult {
        let status = if output.cancelled {
            TaskStatus::NotRun
        } else if output.success {
            TaskStatus::Passed
        } else {
            TaskStatus::Failed
        };

        let failing_files = if status == TaskStatus::Failed {
            self.patterns.extract(&output.combined())
        } else {
            BTreeSet::new()
        };

        TaskResult {
            name: name.to_string(),
            status,
            stdout: output.stdout,
            stderr: output.stderr,
            failing_files,
            duration_ms,
        }
    }
}
