//! Task execution port

use async_trait::async_trait;

use crate::core::models::{ProcessOutput, RunOptions};

/// How a registered task is carried out
///
/// The pipeline only sees this trait, so tests can register strategies that
/// never touch a process.
#[async_trait]
pub trait TaskStrategy: Send + Sync {
    /// Run the check once and report what it produced
    async fn execute(&self, options: &RunOptions) -> ProcessOutput;

    /// Human-readable description, e.g. the command line
    fn describe(&self) -> String;
}
