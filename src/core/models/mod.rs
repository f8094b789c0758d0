//! Domain models for p5
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`Stage`] - Which hook a run was started from
//! - [`TaskResult`] - What one check produced in one run
//! - [`ProcessOutput`] - What one external command left behind
//! - [`Commit`] / [`ScoredCommit`] - History entries and their suspicion score

mod commit;
mod process;
mod stage;
mod task;

pub use commit::{Commit, SHORT_SHA_LEN, ScoredCommit, short_sha};
pub use process::ProcessOutput;
pub use stage::Stage;
pub use task::{RunOptions, TaskResult, TaskStatus};
