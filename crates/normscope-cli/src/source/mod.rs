//! Tabular sources: where table schemas and snapshots come from and where
//! migration plans are executed.
//!
//! Detection and planning live in `normscope-core` and never touch storage;
//! everything that does goes through [`TableSource`].

mod provider;
mod sqlite;

pub use provider::TableSource;
pub use sqlite::SqliteSource;

use normscope_core::{IdentifierError, PlanError, RelationError};
use thiserror::Error;

/// Errors raised while reading from or writing to a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to connect to {target}: {message}")]
    Connection { target: String, message: String },

    #[error(transparent)]
    UnsafeIdentifier(#[from] IdentifierError),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Invalid snapshot: {0}")]
    Relation(#[from] RelationError),

    #[error("Migration of {table} failed at '{step}' and was rolled back: {source}")]
    Migration {
        table: String,
        step: String,
        #[source]
        source: sqlx::Error,
    },
}
