//! normscope CLI library.
//!
//! This module exposes internal types for testing purposes.
//! The main entry point is the `normscope` binary.

pub mod cli;
pub mod decomposer;
pub mod logging;
pub mod output;
pub mod session;
pub mod source;

// Re-export commonly used types
pub use cli::Args;
pub use decomposer::{fix_1nf, fix_2nf, fix_3nf, FixOutcome};
pub use source::{SourceError, SqliteSource, TableSource};
