//! Table schema metadata as reported by the storage layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,

    /// Declared type as written in the table definition; SQLite allows none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,

    #[serde(default)]
    pub not_null: bool,

    /// Default value expression, verbatim SQL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// 1-based position within the primary key, 0 when not a key column.
    #[serde(default)]
    pub primary_key: u32,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, declared_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.map(str::to_string),
            not_null: false,
            default_value: None,
            primary_key: 0,
        }
    }

    pub fn with_not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default_value = Some(expression.into());
        self
    }

    pub fn with_primary_key(mut self, ordinal: u32) -> Self {
        self.primary_key = ordinal;
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key > 0
    }
}

/// Ordered column metadata for a single table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Primary key columns ordered by their position in the key.
    pub fn primary_keys(&self) -> Vec<String> {
        let mut keys: Vec<&ColumnInfo> = self
            .columns
            .iter()
            .filter(|column| column.is_primary_key())
            .collect();
        keys.sort_by_key(|column| column.primary_key);
        keys.into_iter().map(|column| column.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// Returns a copy of this schema without the named column.
    pub fn without_column(&self, name: &str) -> Self {
        Self {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .filter(|column| column.name != name)
                .cloned()
                .collect(),
        }
    }
}
