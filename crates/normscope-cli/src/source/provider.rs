//! Source trait consumed by the fix operations and the session.

use super::SourceError;
use normscope_core::{MigrationPlan, Relation, TableSchema};

/// A database that can list tables, describe them, hand out snapshots and run
/// migration plans.
///
/// Every read returns fresh data; implementations must not cache snapshots
/// between calls since a fix re-validates against the current contents.
pub trait TableSource {
    /// User table names, sorted.
    fn list_tables(&mut self) -> Result<Vec<String>, SourceError>;

    /// Declared columns of `table` in declaration order.
    fn table_schema(&mut self, table: &str) -> Result<TableSchema, SourceError>;

    /// Declared primary key of `table`, ordered by key position.
    fn primary_keys(&mut self, table: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.table_schema(table)?.primary_keys())
    }

    /// Full contents of `table`.
    fn read_relation(&mut self, table: &str) -> Result<Relation, SourceError>;

    /// Runs every statement of `plan` atomically.
    ///
    /// On failure nothing of the plan is left behind.
    fn apply(&mut self, plan: &MigrationPlan) -> Result<(), SourceError>;
}
