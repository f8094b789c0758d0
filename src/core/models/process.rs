//! Captured outcome of one external command

/// What a finished (or abandoned) external command left behind
///
/// Produced by the process runner for every invocation, including ones that
/// never started. `success` is true only for a zero exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit status, `None` when the process could not be spawned or was killed
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error (spawn and timeout diagnostics land here too)
    pub stderr: String,
    /// Whether the command exited with status 0
    pub success: bool,
    /// Whether the command was killed because it ran past its timeout
    pub timed_out: bool,
    /// Whether the command was killed because the run was cancelled
    pub cancelled: bool,
}

impl ProcessOutput {
    /// Output for a command that could not be started at all
    #[must_use]
    pub fn spawn_failure(command: &str, reason: &str) -> Self {
        Self {
            stderr: format!("failed to run {command}: {reason}"),
            ..Self::default()
        }
    }

    /// Output for a command that exited on its own
    #[must_use]
    pub const fn exited(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        let success = matches!(exit_code, Some(0));
        Self {
            exit_code,
            stdout,
            stderr,
            success,
            timed_out: false,
            cancelled: false,
        }
    }

    /// Standard error followed by standard output, the text failure patterns run over
    #[must_use]
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stderr, self.stdout)
    }
}
