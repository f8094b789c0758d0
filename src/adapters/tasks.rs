//! Command-backed tasks
//!
//! Every configured task is a command line run through the process runner.
//! The built-in table covers a typical JavaScript/TypeScript project; entries
//! under `[tasks]` in `p5.toml` replace or extend it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::process;
use crate::config::{Config, secs_to_timeout};
use crate::core::models::{ProcessOutput, RunOptions};
use crate::core::ports::TaskStrategy;
use crate::core::services::TaskRegistry;

/// Tasks available without any configuration, in registration order
pub const BUILTIN_TASKS: &[(&str, &[&str])] = &[
    ("lint", &["npm", "run", "lint"]),
    ("typecheck", &["npx", "tsc", "--noEmit"]),
    ("build", &["npm", "run", "build"]),
    ("test", &["npm", "test"]),
];

/// A task that runs one external command
#[derive(Debug, Clone)]
pub struct CommandTask {
    program: String,
    args: Vec<String>,
    /// `Some` replaces the run's default timeout (`Some(None)` disables it)
    timeout: Option<Option<Duration>>,
}

impl CommandTask {
    /// Create a task from a program and its arguments
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    /// Create a task from a full command line, `None` if it is empty
    #[must_use]
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// Override the run's default timeout for this task (`None` disables it)
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl TaskStrategy for CommandTask {
    async fn execute(&self, options: &RunOptions) -> ProcessOutput {
        let options = match self.timeout {
            Some(timeout) => options.with_timeout(timeout),
            None => options.clone(),
        };
        process::run(&self.program, &self.args, &options).await
    }

    fn describe(&self) -> String {
        process::command_line(&self.program, &self.args)
    }
}

/// Build the task registry: built-in tasks, then configured ones
///
/// A configured task with a built-in name replaces it in place; other
/// configured tasks are appended in name order.
#[must_use]
pub fn build_registry(config: &Config) -> TaskRegistry {
    let mut registry = TaskRegistry::new();

    for (name, command) in BUILTIN_TASKS {
        let args = command[1..].iter().map(ToString::to_string).collect();
        registry = registry.with_task(*name, Arc::new(CommandTask::new(command[0], args)));
    }

    for (name, definition) in &config.tasks {
        let Some(task) = CommandTask::from_command(&definition.command) else {
            continue;
        };
        let task = match definition.timeout_secs {
            Some(secs) => task.with_timeout(secs_to_timeout(secs)),
            None => task,
        };
        registry = registry.with_task(name.clone(), Arc::new(task));
    }

    registry
}
