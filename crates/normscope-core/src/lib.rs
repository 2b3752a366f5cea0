//! Normal form analysis and decomposition planning for relational tables.
//!
//! The crate works on in-memory snapshots: a [`Relation`] holds the rows of one
//! table and a [`TableSchema`] its declared columns. [`analyze`] reports 1NF,
//! 2NF and 3NF violations found in the data, and the planners in [`decompose`]
//! turn those findings into ordered SQL migration steps. Nothing here touches a
//! database.

pub mod decompose;
pub mod detector;
pub mod identifier;
pub mod types;

pub use decompose::{
    plan_dependency_decomposition, plan_first_normal_form, DecomposeOptions, MigrationPlan,
    MigrationStep, NormalForm, PlanError, SkipReason, SkippedDependency, Statement, StepKind,
    TypePolicy,
};
pub use detector::{
    analyze, detect_1nf, detect_2nf, detect_3nf, find_multivalued_columns,
    find_partial_dependencies, find_transitive_dependencies, LIST_DELIMITERS,
};
pub use identifier::IdentifierError;
pub use types::{
    ColumnInfo, FunctionalDependency, Relation, RelationError, TableSchema, Value,
    ViolationReport,
};
