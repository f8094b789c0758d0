//! Adapter implementations for port traits
//!
//! This module contains concrete implementations that handle I/O:
//!
//! - `process` - Spawning external commands
//! - `git/` - Commit history via libgit2
//! - `tasks` - Command-backed task strategies and the built-in task table
//! - `notify` - Webhook notifications

pub mod git;
pub mod notify;
pub mod process;
pub mod tasks;

pub use git::GitHistory;
pub use tasks::CommandTask;
