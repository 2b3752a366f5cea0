//! Migration planning for schema decomposition.
//!
//! A plan is the ordered saga the storage layer runs to remove one class of
//! violation: create the child table, fill it, park the parent under an aside
//! name, recreate the parent without the moved column, copy the rows back and
//! drop the aside copy. Planning is pure; executing a plan (ideally inside a
//! single transaction) is the caller's job.

mod ddl;
mod dependency;
mod first;

pub use dependency::plan_dependency_decomposition;
pub use first::plan_first_normal_form;

use crate::identifier::IdentifierError;
use crate::types::{FunctionalDependency, Value};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The normal form a decomposition establishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum NormalForm {
    #[serde(rename = "1nf")]
    First,
    #[serde(rename = "2nf")]
    Second,
    #[serde(rename = "3nf")]
    Third,
}

impl NormalForm {
    pub const ALL: [NormalForm; 3] = [NormalForm::First, NormalForm::Second, NormalForm::Third];

    /// Suffix used when naming child tables.
    pub fn suffix(self) -> &'static str {
        match self {
            NormalForm::First => "1nf",
            NormalForm::Second => "2nf",
            NormalForm::Third => "3nf",
        }
    }
}

impl fmt::Display for NormalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suffix().to_ascii_uppercase())
    }
}

impl FromStr for NormalForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "1nf" | "first" => Ok(NormalForm::First),
            "2" | "2nf" | "second" => Ok(NormalForm::Second),
            "3" | "3nf" | "third" => Ok(NormalForm::Third),
            other => Err(format!("unknown normal form '{other}' (expected 1nf, 2nf or 3nf)")),
        }
    }
}

/// How column types are carried into rebuilt and child tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TypePolicy {
    /// Keep declared type, NOT NULL and DEFAULT of every column.
    #[default]
    Preserve,
    /// Declare every column of a 2NF/3NF decomposition as plain `TEXT`.
    ///
    /// The 1NF path keeps declared types regardless.
    GenericText,
}

/// Options shared by all planners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecomposeOptions {
    #[serde(default)]
    pub type_policy: TypePolicy,
}

/// Errors that prevent a plan from being produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("No primary key defined on {0}")]
    MissingPrimaryKey(String),

    #[error(transparent)]
    UnsafeIdentifier(#[from] IdentifierError),

    #[error("Column '{column}' not found in table {table}")]
    UnknownColumn { table: String, column: String },
}

/// A single SQL statement with positional `?` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Statement {
    pub sql: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Saga step kinds, in the order they appear for each decomposed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    DropChild,
    CreateChild,
    PopulateChild,
    RenameAside,
    CreateParent,
    CopyRows,
    DropAside,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStep {
    pub kind: StepKind,
    pub description: String,
    pub statements: Vec<Statement>,
}

/// Ordered steps that decompose one table for one normal form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationPlan {
    pub table: String,
    pub form: NormalForm,
    pub steps: Vec<MigrationStep>,
    /// Child tables created by this plan, in creation order.
    pub child_tables: Vec<String>,
    /// Dependencies left in the parent, with the reason each was not applied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedDependency>,
}

/// Why a detected dependency was not decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// A column it needs was moved out of the parent by an earlier step.
    ColumnsMoved,
    /// Some dependent values could not be joined back through the determinant:
    /// a row with a null determinant carries a value, or rows sharing a
    /// determinant disagree on whether the dependent is null.
    UnrecoverableValues,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ColumnsMoved => f.write_str("columns already moved"),
            SkipReason::UnrecoverableValues => {
                f.write_str("values not recoverable through the determinant")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDependency {
    pub dependency: FunctionalDependency,
    pub reason: SkipReason,
}

impl SkippedDependency {
    pub fn new(dependency: FunctionalDependency, reason: SkipReason) -> Self {
        Self { dependency, reason }
    }
}

impl fmt::Display for SkippedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.dependency, self.reason)
    }
}

impl MigrationPlan {
    pub fn new(table: impl Into<String>, form: NormalForm) -> Self {
        Self {
            table: table.into(),
            form,
            steps: Vec::new(),
            child_tables: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// True when there is nothing to execute.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// All statements across all steps, in execution order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.steps.iter().flat_map(|step| step.statements.iter())
    }

    fn push(&mut self, kind: StepKind, description: String, statements: Vec<Statement>) {
        self.steps.push(MigrationStep {
            kind,
            description,
            statements,
        });
    }
}
