//! Output formatting modules.

pub mod json;
pub mod table;

pub use json::format_json;
pub use table::{format_event, format_plan, format_report};

use crate::decomposer::FixOutcome;
use normscope_core::{MigrationPlan, Relation, Value, ViolationReport};
use serde::Serialize;

/// Everything reported about one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    pub table: String,
    pub primary_key: Vec<String>,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub violations: ViolationReport,
    /// Fixes applied before the violations were collected.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<FixOutcome>,
    /// Migrations planned but not executed (`--dry-run`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<MigrationPlan>,
    /// Leading rows of the table.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub preview: Vec<Vec<Value>>,
}

impl TableReport {
    pub fn new(
        table: impl Into<String>,
        primary_key: Vec<String>,
        relation: &Relation,
        violations: ViolationReport,
        preview_rows: usize,
    ) -> Self {
        Self {
            table: table.into(),
            primary_key,
            row_count: relation.row_count(),
            columns: relation.columns().to_vec(),
            violations,
            fixes: Vec::new(),
            plans: Vec::new(),
            preview: relation.rows().iter().take(preview_rows).cloned().collect(),
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.violations.is_clean()
    }
}
