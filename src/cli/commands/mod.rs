//! Command implementations


pub use test::{TestArgs, test};
