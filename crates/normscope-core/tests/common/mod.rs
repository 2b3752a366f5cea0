#![allow(dead_code)]

use normscope_core::{ColumnInfo, Relation, TableSchema, Value};

/// Builds a relation whose cells are all text, `None` meaning NULL.
pub fn text_relation(columns: &[&str], rows: &[&[Option<&str>]]) -> Relation {
    Relation::from_rows(
        columns.iter().copied(),
        rows.iter()
            .map(|row| row.iter().map(|cell| Value::from(*cell)).collect())
            .collect(),
    )
    .expect("well-formed relation")
}

pub fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// A schema declaring every column as TEXT with the given key columns.
pub fn text_schema(table: &str, columns: &[&str], primary_key: &[&str]) -> TableSchema {
    TableSchema::new(
        table,
        columns
            .iter()
            .map(|name| {
                let column = ColumnInfo::new(*name, Some("TEXT"));
                match primary_key.iter().position(|key| key == name) {
                    Some(ordinal) => column.with_primary_key(ordinal as u32 + 1),
                    None => column,
                }
            })
            .collect(),
    )
}
