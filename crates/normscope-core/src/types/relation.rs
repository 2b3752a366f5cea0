//! In-memory relation snapshots.

use super::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling a relation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelationError {
    #[error("Row has {found} values but the relation has {expected} columns")]
    ArityMismatch { expected: usize, found: usize },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
}

/// An immutable snapshot of a table's contents.
///
/// Columns keep the declared schema order; rows are positional and aligned
/// with `columns`. Detection never mutates a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Relation {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Relation {
    /// Creates an empty relation with the given column order.
    pub fn new<I, S>(columns: I) -> Result<Self, RelationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for column in columns {
            let column = column.into();
            if names.contains(&column) {
                return Err(RelationError::DuplicateColumn(column));
            }
            names.push(column);
        }

        Ok(Self {
            columns: names,
            rows: Vec::new(),
        })
    }

    /// Builds a relation from column names and rows in one call.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self, RelationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut relation = Self::new(columns)?;
        for row in rows {
            relation.push_row(row)?;
        }
        Ok(relation)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), RelationError> {
        if row.len() != self.columns.len() {
            return Err(RelationError::ArityMismatch {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the value of `column` in row `row`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|values| &values[index])
    }

    /// Iterates the values of a single column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Whether the column holds at least one value and only numbers.
    ///
    /// Numeric columns are never candidates for multi-valued detection.
    pub fn is_numeric_column(&self, index: usize) -> bool {
        let mut saw_value = false;
        for value in self.column_values(index) {
            match value {
                Value::Null => {}
                Value::Integer(_) | Value::Real(_) => saw_value = true,
                _ => return false,
            }
        }
        saw_value
    }
}
