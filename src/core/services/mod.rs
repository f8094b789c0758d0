//! Business logic services
//!
//! - [`extractor`] - Pull implicated file paths out of diagnostic text
//! - [`pipeline`] - Run tasks in order and aggregate their results
//! - [`scorer`] - Rank branch commits against failing files

pub mod extractor;
pub mod pipeline;
pub mod scorer;

pub use extractor::{FailurePatterns, GENERATED_DIRS, extract_failing_files, is_generated_path};
pub use pipeline::{Pipeline, PipelineReport, TaskRegistry};
pub use scorer::{CulpritScorer, MAX_SUSPECTS, overlap_score, rank};
