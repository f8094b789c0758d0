//! Adapter tests
//!
//! Tests for I/O adapter implementations against real repositories and
//! processes:
//! - Git commit history
//! - Command tasks

#[path = "../common/mod.rs"]
#[allow(dead_code)]
mod common;

mod git_history_test;
