//! 2NF/3NF decomposition: move a dependent attribute into a child table keyed
//! by its determinant.

use super::ddl::{
    aliases_rowid, column_definition, create_table, drop_table_if_exists, push_parent_rebuild,
    quoted_list, ColumnStyle,
};
use super::{
    DecomposeOptions, MigrationPlan, NormalForm, PlanError, SkipReason, SkippedDependency,
    Statement, StepKind, TypePolicy,
};
use crate::detector::grouping::is_recoverable;
use crate::identifier::{dependency_child_name, quote_identifier, validate_identifier};
use crate::types::{ColumnInfo, FunctionalDependency, Relation, TableSchema};
#[cfg(feature = "tracing")]
use tracing::debug;

/// Plans one child table per dependency and drops each dependent from the parent.
///
/// The child `{table}_{dependent}_{form}` is keyed by the determinant and holds
/// one row per non-null determinant value together with its dependent value.
/// Dependencies are reordered so that a column is moved out only after every
/// dependency that uses it as a determinant has been applied.
///
/// `relation` is the snapshot the dependencies were found in. A dependency is
/// left in place and reported in [`MigrationPlan::skipped`] when its columns
/// have already left the parent, or when some of its dependent values could
/// not be joined back through the determinant (for example a value on a row
/// whose determinant is null).
pub fn plan_dependency_decomposition(
    schema: &TableSchema,
    relation: &Relation,
    dependencies: &[FunctionalDependency],
    form: NormalForm,
    options: &DecomposeOptions,
) -> Result<MigrationPlan, PlanError> {
    let table = validate_identifier(&schema.name)?;
    let quoted_table = quote_identifier(table)?;
    let mut plan = MigrationPlan::new(table, form);

    let style = match options.type_policy {
        TypePolicy::Preserve => ColumnStyle::Full,
        TypePolicy::GenericText => ColumnStyle::Text,
    };
    let keys = schema.primary_keys();
    let mut current = schema.clone();

    for dependency in order_for_execution(dependencies) {
        let missing = dependency
            .determinant
            .iter()
            .chain(std::iter::once(&dependency.dependent))
            .any(|column| current.column(column).is_none());
        if missing {
            #[cfg(feature = "tracing")]
            debug!(table, %dependency, "skipping dependency whose columns already moved");
            plan.skipped
                .push(SkippedDependency::new(dependency, SkipReason::ColumnsMoved));
            continue;
        }

        let determinant_indices = dependency
            .determinant
            .iter()
            .map(|column| column_index(relation, table, column))
            .collect::<Result<Vec<_>, _>>()?;
        let dependent_index = column_index(relation, table, &dependency.dependent)?;
        if !is_recoverable(relation, &determinant_indices, dependent_index) {
            #[cfg(feature = "tracing")]
            debug!(table, %dependency, "skipping dependency that would drop values");
            plan.skipped.push(SkippedDependency::new(
                dependency,
                SkipReason::UnrecoverableValues,
            ));
            continue;
        }

        let child = dependency_child_name(table, &dependency.dependent, form.suffix());
        let quoted_child = quote_identifier(&child)?;

        let mut infos: Vec<&ColumnInfo> = Vec::with_capacity(dependency.determinant.len() + 1);
        for column in dependency
            .determinant
            .iter()
            .chain(std::iter::once(&dependency.dependent))
        {
            infos.push(current.column(column).ok_or_else(|| PlanError::UnknownColumn {
                table: table.to_string(),
                column: column.clone(),
            })?);
        }
        let definitions = infos
            .iter()
            .map(|info| column_definition(info, style))
            .collect::<Result<Vec<_>, _>>()?;

        let mut create = create_table(&child, &definitions, &dependency.determinant)?;
        // Keeps an INTEGER determinant from becoming the rowid.
        if aliases_rowid(&infos[..dependency.determinant.len()], style) {
            create.push_str(" WITHOUT ROWID");
        }

        let determinant = quoted_list(&dependency.determinant)?;
        let dependent = quote_identifier(&dependency.dependent)?;
        let not_null = dependency
            .determinant
            .iter()
            .map(|column| quote_identifier(column).map(|quoted| format!("{quoted} IS NOT NULL")))
            .collect::<Result<Vec<_>, _>>()?
            .join(" AND ");

        plan.push(
            StepKind::DropChild,
            format!("drop previous {child}"),
            vec![drop_table_if_exists(&child)?],
        );
        plan.push(
            StepKind::CreateChild,
            format!("create {child} for {dependency}"),
            vec![Statement::new(create)],
        );
        plan.push(
            StepKind::PopulateChild,
            format!("copy distinct {dependency} pairs into {child}"),
            vec![Statement::new(format!(
                "INSERT INTO {quoted_child} ({determinant}, {dependent}) \
                 SELECT {determinant}, MAX({dependent}) FROM {quoted_table} \
                 WHERE {not_null} GROUP BY {determinant}"
            ))],
        );

        current = current.without_column(&dependency.dependent);
        push_parent_rebuild(&mut plan, &current, &keys, style)?;
        plan.child_tables.push(child);
    }

    Ok(plan)
}

fn column_index(relation: &Relation, table: &str, column: &str) -> Result<usize, PlanError> {
    relation
        .column_index(column)
        .ok_or_else(|| PlanError::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
}

/// Orders dependencies so that a dependent column is moved only after every
/// dependency that needs it as a determinant.
///
/// Otherwise keeps the input order. Cycles fall back to input order.
fn order_for_execution(dependencies: &[FunctionalDependency]) -> Vec<FunctionalDependency> {
    let mut pending: Vec<FunctionalDependency> = dependencies.to_vec();
    let mut ordered = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let next = pending
            .iter()
            .position(|candidate| {
                !pending.iter().any(|other| {
                    other != candidate && other.determinant.contains(&candidate.dependent)
                })
            })
            .unwrap_or(0);
        ordered.push(pending.remove(next));
    }

    ordered
}
