//! Core domain logic for p5
//!
//! This module holds the attribution logic. Processes, git and the network are
//! reached only through port traits or plain data handed in by the caller.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (`TaskResult`, `Commit`, `Stage`, `ProcessOutput`)
//! - `services/` - Extraction, pipeline orchestration, culprit scoring
//! - `ports/` - Trait definitions for external dependencies

pub mod models;
pub mod ports;
pub mod services;
