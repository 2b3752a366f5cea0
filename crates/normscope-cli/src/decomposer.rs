//! Inspection and fix operations over a [`TableSource`].
//!
//! Every operation re-reads the table before acting. A fix never trusts an
//! earlier detection result: the violations it removes are the ones present in
//! the snapshot taken at the start of the call.

use crate::output::TableReport;
use crate::source::{SourceError, TableSource};
use normscope_core::identifier::validate_identifier;
use normscope_core::{
    analyze, find_partial_dependencies, find_transitive_dependencies,
    plan_dependency_decomposition, plan_first_normal_form, DecomposeOptions, MigrationPlan,
    NormalForm, SkippedDependency,
};
use serde::Serialize;
use tracing::{info, warn};

/// Result of one fix call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    pub table: String,
    pub form: NormalForm,
    /// Child tables created, in creation order.
    pub child_tables: Vec<String>,
    /// Dependencies left in place, each with the reason.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedDependency>,
}

impl FixOutcome {
    fn from_plan(plan: &MigrationPlan) -> Self {
        Self {
            table: plan.table.clone(),
            form: plan.form,
            child_tables: plan.child_tables.clone(),
            skipped: plan.skipped.clone(),
        }
    }

    /// True when the table was already free of the violation.
    pub fn is_noop(&self) -> bool {
        self.child_tables.is_empty()
    }
}

/// Splits table names into those safe to put in generated statements and
/// those that are not, keeping the input order in both.
pub fn partition_tables(tables: Vec<String>) -> (Vec<String>, Vec<String>) {
    tables
        .into_iter()
        .partition(|table| validate_identifier(table).is_ok())
}

/// Reads `table` and reports its violations against the declared key.
pub fn inspect<S: TableSource + ?Sized>(
    source: &mut S,
    table: &str,
    preview_rows: usize,
) -> Result<TableReport, SourceError> {
    validate_identifier(table)?;
    let schema = source.table_schema(table)?;
    let relation = source.read_relation(table)?;
    let primary_key = schema.primary_keys();
    let violations = analyze(&relation, &primary_key);

    Ok(TableReport::new(
        table,
        primary_key,
        &relation,
        violations,
        preview_rows,
    ))
}

/// Builds the migration that would remove `form` violations from `table`
/// without running it.
///
/// `primary_keys` overrides the declared key for 2NF/3NF detection; the 1NF
/// split always scopes child rows by the declared key.
pub fn plan_fix<S: TableSource + ?Sized>(
    source: &mut S,
    table: &str,
    form: NormalForm,
    primary_keys: Option<&[String]>,
    options: &DecomposeOptions,
) -> Result<MigrationPlan, SourceError> {
    validate_identifier(table)?;
    let schema = source.table_schema(table)?;
    let relation = source.read_relation(table)?;
    let keys = primary_keys
        .map(<[String]>::to_vec)
        .unwrap_or_else(|| schema.primary_keys());

    let plan = match form {
        NormalForm::First => plan_first_normal_form(&schema, &relation, options)?,
        NormalForm::Second => {
            let dependencies = find_partial_dependencies(&relation, &keys);
            plan_dependency_decomposition(&schema, &relation, &dependencies, form, options)?
        }
        NormalForm::Third => {
            let dependencies = find_transitive_dependencies(&relation, &keys);
            plan_dependency_decomposition(&schema, &relation, &dependencies, form, options)?
        }
    };

    for skipped in &plan.skipped {
        warn!(
            table,
            dependency = %skipped.dependency,
            reason = %skipped.reason,
            "dependency left in place"
        );
    }
    Ok(plan)
}

/// Re-detects and removes `form` violations from `table` in one transaction.
pub fn fix<S: TableSource + ?Sized>(
    source: &mut S,
    table: &str,
    form: NormalForm,
    primary_keys: Option<&[String]>,
    options: &DecomposeOptions,
) -> Result<FixOutcome, SourceError> {
    let plan = plan_fix(source, table, form, primary_keys, options)?;
    if plan.is_empty() {
        info!(table, %form, "nothing to fix");
        return Ok(FixOutcome::from_plan(&plan));
    }

    info!(
        table,
        %form,
        steps = plan.steps.len(),
        children = plan.child_tables.len(),
        "applying decomposition"
    );
    source.apply(&plan)?;
    Ok(FixOutcome::from_plan(&plan))
}

/// Splits every multi-valued column of `table` into a child table.
pub fn fix_1nf<S: TableSource + ?Sized>(
    source: &mut S,
    table: &str,
) -> Result<FixOutcome, SourceError> {
    fix(source, table, NormalForm::First, None, &DecomposeOptions::default())
}

/// Moves attributes that depend on part of a composite key into child tables.
pub fn fix_2nf<S: TableSource + ?Sized>(
    source: &mut S,
    table: &str,
    primary_keys: Option<&[String]>,
    options: &DecomposeOptions,
) -> Result<FixOutcome, SourceError> {
    fix(source, table, NormalForm::Second, primary_keys, options)
}

/// Moves attributes that depend on another non-key attribute into child tables.
pub fn fix_3nf<S: TableSource + ?Sized>(
    source: &mut S,
    table: &str,
    primary_keys: Option<&[String]>,
    options: &DecomposeOptions,
) -> Result<FixOutcome, SourceError> {
    fix(source, table, NormalForm::Third, primary_keys, options)
}
