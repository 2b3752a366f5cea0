//! 1NF decomposition: split multi-valued columns into child tables.

use super::ddl::{column_definition, drop_table_if_exists, push_parent_rebuild, quoted_list, ColumnStyle};
use super::{DecomposeOptions, MigrationPlan, NormalForm, PlanError, Statement, StepKind};
use crate::detector::find_multivalued_columns;
use crate::identifier::{multivalued_child_name, quote_identifier, validate_identifier};
use crate::types::{Relation, TableSchema, Value};
#[cfg(feature = "tracing")]
use tracing::debug;

/// Plans the removal of every multi-valued column found in `relation`.
///
/// Detection runs on the snapshot handed in, never on an earlier result. For
/// each violating column a child table `{table}_{column}_1nf` receives the key
/// columns plus one row per comma-separated piece, then the parent is rebuilt
/// without the column. Each column is planned against the parent as left by
/// the previous one. Key columns are never split, whatever they contain.
///
/// Returns an empty plan when the snapshot is already in 1NF, and
/// [`PlanError::MissingPrimaryKey`] when there is work to do but no declared
/// key to scope the child rows.
pub fn plan_first_normal_form(
    schema: &TableSchema,
    relation: &Relation,
    _options: &DecomposeOptions,
) -> Result<MigrationPlan, PlanError> {
    let table = validate_identifier(&schema.name)?;
    let mut plan = MigrationPlan::new(table, NormalForm::First);

    let keys = schema.primary_keys();
    let violations: Vec<String> = find_multivalued_columns(relation)
        .into_iter()
        .filter(|column| !keys.contains(column))
        .collect();
    if violations.is_empty() {
        return Ok(plan);
    }

    if keys.is_empty() {
        return Err(PlanError::MissingPrimaryKey(table.to_string()));
    }
    let key_indices = keys
        .iter()
        .map(|key| {
            relation.column_index(key).ok_or_else(|| PlanError::UnknownColumn {
                table: table.to_string(),
                column: key.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut current = schema.clone();
    for column in violations {
        let info = current
            .column(&column)
            .cloned()
            .ok_or_else(|| PlanError::UnknownColumn {
                table: table.to_string(),
                column: column.clone(),
            })?;
        let value_index = relation
            .column_index(&column)
            .ok_or_else(|| PlanError::UnknownColumn {
                table: table.to_string(),
                column: column.clone(),
            })?;

        let child = multivalued_child_name(table, &column);
        let quoted_child = quote_identifier(&child)?;

        let mut definitions = Vec::with_capacity(keys.len() + 1);
        for key in &keys {
            let key_info = current.column(key).ok_or_else(|| PlanError::UnknownColumn {
                table: table.to_string(),
                column: key.clone(),
            })?;
            definitions.push(column_definition(key_info, ColumnStyle::TypeAndNullability)?);
        }
        definitions.push(column_definition(&info, ColumnStyle::TypeOnly)?);

        let mut child_columns = keys.clone();
        child_columns.push(column.clone());
        let insert = format!(
            "INSERT INTO {quoted_child} ({}) VALUES ({})",
            quoted_list(&child_columns)?,
            vec!["?"; child_columns.len()].join(", ")
        );

        let mut inserts = Vec::new();
        for row in relation.rows() {
            let Some(text) = row[value_index].as_text() else {
                continue;
            };
            for piece in text.split(',') {
                let mut params: Vec<Value> = key_indices.iter().map(|&i| row[i].clone()).collect();
                params.push(Value::Text(piece.trim().to_string()));
                inserts.push(Statement::with_params(insert.clone(), params));
            }
        }

        #[cfg(feature = "tracing")]
        debug!(table, column = %column, child = %child, rows = inserts.len(), "planned 1NF split");

        plan.push(
            StepKind::DropChild,
            format!("drop previous {child}"),
            vec![drop_table_if_exists(&child)?],
        );
        plan.push(
            StepKind::CreateChild,
            format!("create {child}"),
            vec![Statement::new(format!(
                "CREATE TABLE {quoted_child} ({})",
                definitions.join(", ")
            ))],
        );
        plan.push(
            StepKind::PopulateChild,
            format!("split {column} into {child}"),
            inserts,
        );

        current = current.without_column(&column);
        push_parent_rebuild(&mut plan, &current, &keys, ColumnStyle::Full)?;
        plan.child_tables.push(child);
    }

    Ok(plan)
}
