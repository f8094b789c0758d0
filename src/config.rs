//! Project configuration
//!
//! Loaded once at startup from `p5.toml`, discovered from the working
//! directory up to the repository root. Every field has a default, so a
//! missing file or a partial file is fine.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::core::models::Stage;
use crate::core::services::FailurePatterns;
use crate::core::services::scorer::DEFAULT_MAX_CONCURRENT_LOOKUPS;

/// Configuration file name
pub const CONFIG_FILE: &str = "p5.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape
    #[error("invalid config in {}: {source}", path.display())]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// A task was defined without a command
    #[error("task '{0}' has an empty command")]
    EmptyCommand(String),

    /// An extra failure pattern does not compile
    #[error("invalid failure pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Underlying error
        source: regex::Error,
    },
}

/// Top-level p5 configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Task lists per stage
    pub tests: TestsConfig,
    /// Where failure notifications go
    pub notifications: NotificationsConfig,
    /// Timeouts and concurrency limits
    pub pipeline: PipelineConfig,
    /// Extra failure-extraction rules
    pub patterns: PatternsConfig,
    /// Task definitions, overriding or extending the built-in tasks
    pub tasks: BTreeMap<String, TaskDefinition>,
}

/// Task lists per stage
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestsConfig {
    /// Tasks run by the pre-commit stage
    #[serde(alias = "preCommit")]
    pub pre_commit: Vec<String>,
    /// Tasks run by the pre-push stage
    #[serde(alias = "prePush")]
    pub pre_push: Vec<String>,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            pre_commit: vec!["lint".to_string(), "typecheck".to_string()],
            pre_push: ["lint", "typecheck", "build", "test"].iter().map(ToString::to_string).collect(),
        }
    }
}

/// Notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Notifications are disabled
    #[default]
    None,
    /// Slack incoming webhook (`text` field)
    Slack,
    /// Discord webhook (`content` field)
    Discord,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Slack => write!(f, "slack"),
            Self::Discord => write!(f, "discord"),
        }
    }
}

/// Notification settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Which provider's payload shape to post
    pub provider: Provider,
    /// Webhook URL
    pub webhook: Option<String>,
}

/// Pipeline limits
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Default per-task timeout in seconds (0 disables)
    pub task_timeout_secs: u64,
    /// Upper bound on concurrent changed-file lookups
    pub max_concurrent_lookups: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            task_timeout_secs: 600,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }
}

/// Additions to the failure-extraction rule chain
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Regexes appended after the built-in rules
    pub extra: Vec<String>,
    /// Directory names to ignore on top of the built-in list
    pub ignored_dirs: Vec<String>,
}

/// A configured task
#[derive(Debug, Clone, Deserialize)]
pub struct TaskDefinition {
    /// Program followed by its arguments
    pub command: Vec<String>,
    /// Timeout override in seconds (0 disables)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Parse configuration text; `origin` is only used in error messages
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Find and load `p5.toml` starting at `from`, or fall back to defaults
    pub fn discover(from: &Path) -> Result<Self, ConfigError> {
        match find_config(from) {
            Some(path) => {
                log::debug!("Loading config from {}", path.display());
                Self::load(&path)
            },
            None => Ok(Self::default()),
        }
    }

    /// Reject definitions that cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((name, _)) = self.tasks.iter().find(|(_, t)| t.command.is_empty()) {
            return Err(ConfigError::EmptyCommand(name.clone()));
        }
        self.failure_patterns().map(|_| ())
    }

    /// Task names a stage runs, in order
    ///
    /// `ci` runs the pre-commit list followed by pre-push tasks not already listed.
    #[must_use]
    pub fn tasks_for_stage(&self, stage: Stage) -> Vec<String> {
        match stage {
            Stage::PreCommit => self.tests.pre_commit.clone(),
            Stage::PrePush => self.tests.pre_push.clone(),
            Stage::Ci => {
                let mut tasks = self.tests.pre_commit.clone();
                for task in &self.tests.pre_push {
                    if !tasks.contains(task) {
                        tasks.push(task.clone());
                    }
                }
                tasks
            },
        }
    }

    /// Default timeout applied to every task
    #[must_use]
    pub const fn default_task_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.pipeline.task_timeout_secs)
    }

    /// Built-in rule chain extended with the configured rules and directories
    pub fn failure_patterns(&self) -> Result<FailurePatterns, ConfigError> {
        let mut patterns = FailurePatterns::builtin();
        for pattern in &self.patterns.extra {
            patterns = patterns.with_pattern(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        for dir in &self.patterns.ignored_dirs {
            patterns = patterns.with_ignored_dir(dir.clone());
        }
        Ok(patterns)
    }
}

/// Convert a seconds setting to a timeout, 0 meaning none
#[must_use]
pub const fn secs_to_timeout(secs: u64) -> Option<Duration> {
    if secs == 0 { None } else { Some(Duration::from_secs(secs)) }
}

/// Find `p5.toml` from `from` up to the repository root
///
/// The walk stops at the first directory containing `.git`, or at the
/// filesystem root.
#[must_use]
pub fn find_config(from: &Path) -> Option<PathBuf> {
    let mut current = from.to_path_buf();

    // Normalize: if it's a file, start from parent
    if current.is_file() {
        current = current.parent().unwrap_or(from).to_path_buf();
    }

    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }

        // Stop at repo root (.git) or filesystem root
        if current.join(".git").exists() {
            return None;
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}
