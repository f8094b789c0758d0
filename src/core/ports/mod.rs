//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between the attribution logic and the
//! outside world (version control, external check commands).
//!
//! Implementations live in the `adapters` module. Tests substitute their own.

mod history;
mod task_strategy;

pub use history::CommitHistory;
pub use task_strategy::TaskStrategy;
