//! DDL fragments shared by the planners.

use super::{MigrationPlan, Statement, StepKind};
use crate::identifier::{aside_name, quote_identifier, validate_declared_type, IdentifierError};
use crate::types::{ColumnInfo, TableSchema};

/// Which parts of a source column definition are carried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnStyle {
    /// Declared type, NOT NULL and DEFAULT.
    Full,
    /// Declared type and NOT NULL.
    TypeAndNullability,
    /// Declared type only.
    TypeOnly,
    /// Plain `TEXT`.
    Text,
}

pub(crate) fn column_definition(
    column: &ColumnInfo,
    style: ColumnStyle,
) -> Result<String, IdentifierError> {
    let mut definition = quote_identifier(&column.name)?;

    if style == ColumnStyle::Text {
        definition.push_str(" TEXT");
        return Ok(definition);
    }

    if let Some(declared) = column.declared_type.as_deref().filter(|t| !t.trim().is_empty()) {
        definition.push(' ');
        definition.push_str(validate_declared_type(declared.trim())?);
    }

    if matches!(style, ColumnStyle::Full | ColumnStyle::TypeAndNullability) && column.not_null {
        definition.push_str(" NOT NULL");
    }

    if style == ColumnStyle::Full {
        if let Some(default) = &column.default_value {
            definition.push_str(" DEFAULT ");
            definition.push_str(default);
        }
    }

    Ok(definition)
}

pub(crate) fn quoted_list<S: AsRef<str>>(names: &[S]) -> Result<String, IdentifierError> {
    let quoted: Result<Vec<String>, _> = names.iter().map(|n| quote_identifier(n.as_ref())).collect();
    Ok(quoted?.join(", "))
}

pub(crate) fn create_table(
    name: &str,
    definitions: &[String],
    primary_key: &[String],
) -> Result<String, IdentifierError> {
    let mut body = definitions.join(", ");
    if !primary_key.is_empty() {
        body.push_str(&format!(", PRIMARY KEY ({})", quoted_list(primary_key)?));
    }
    Ok(format!("CREATE TABLE {} ({body})", quote_identifier(name)?))
}

/// Whether SQLite would make `PRIMARY KEY (key)` an alias of the rowid.
///
/// That happens for a single key column declared exactly `INTEGER`, and such a
/// column then rejects every non-integer value.
pub(crate) fn aliases_rowid(key: &[&ColumnInfo], style: ColumnStyle) -> bool {
    if style == ColumnStyle::Text {
        return false;
    }
    match key {
        [column] => column
            .declared_type
            .as_deref()
            .is_some_and(|declared| declared.trim().eq_ignore_ascii_case("INTEGER")),
        _ => false,
    }
}

pub(crate) fn drop_table_if_exists(name: &str) -> Result<Statement, IdentifierError> {
    Ok(Statement::new(format!(
        "DROP TABLE IF EXISTS {}",
        quote_identifier(name)?
    )))
}

/// Appends the rename-aside / recreate / copy / drop-aside steps that rebuild
/// `remaining.name` with only the columns listed in `remaining`.
pub(crate) fn push_parent_rebuild(
    plan: &mut MigrationPlan,
    remaining: &TableSchema,
    primary_key: &[String],
    style: ColumnStyle,
) -> Result<(), IdentifierError> {
    let table = quote_identifier(&remaining.name)?;
    let aside = aside_name(&remaining.name);
    let quoted_aside = quote_identifier(&aside)?;

    let definitions = remaining
        .columns
        .iter()
        .map(|column| column_definition(column, style))
        .collect::<Result<Vec<_>, _>>()?;
    let key: Vec<String> = primary_key
        .iter()
        .filter(|name| remaining.column(name).is_some())
        .cloned()
        .collect();
    let columns = quoted_list(&remaining.column_names())?;

    plan.push(
        StepKind::RenameAside,
        format!("move {} aside as {aside}", remaining.name),
        vec![Statement::new(format!(
            "ALTER TABLE {table} RENAME TO {quoted_aside}"
        ))],
    );
    plan.push(
        StepKind::CreateParent,
        format!("recreate {} without the moved column", remaining.name),
        vec![Statement::new(create_table(&remaining.name, &definitions, &key)?)],
    );
    plan.push(
        StepKind::CopyRows,
        format!("copy rows from {aside} into {}", remaining.name),
        vec![Statement::new(format!(
            "INSERT INTO {table} ({columns}) SELECT {columns} FROM {quoted_aside}"
        ))],
    );
    plan.push(
        StepKind::DropAside,
        format!("drop {aside}"),
        vec![Statement::new(format!("DROP TABLE {quoted_aside}"))],
    );

    Ok(())
}
