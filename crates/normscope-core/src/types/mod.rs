//! Types for normal form analysis.
//!
//! This module defines the relation snapshot consumed by the detector, the
//! table schema reported by the storage layer, and the report types returned
//! to callers.

mod relation;
mod report;
mod schema;
mod value;

pub use relation::{Relation, RelationError};
pub use report::{FunctionalDependency, ViolationReport};
pub use schema::{ColumnInfo, TableSchema};
pub use value::Value;
