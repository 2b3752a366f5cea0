//! Single-pass grouping primitives shared by the dependency searches.

use crate::types::{Relation, Value};
use std::collections::{HashMap, HashSet};

/// Hashable view of a cell used as a group-by key.
///
/// Integral reals share a key with the matching integer, so `1` and `1.0`
/// land in the same group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum GroupKey<'a> {
    Null,
    Integer(i64),
    Real(u64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl<'a> From<&'a Value> for GroupKey<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => GroupKey::Null,
            Value::Integer(n) => GroupKey::Integer(*n),
            Value::Real(x) => {
                if x.fract() == 0.0 && *x >= i64::MIN as f64 && *x < i64::MAX as f64 {
                    GroupKey::Integer(*x as i64)
                } else {
                    GroupKey::Real(x.to_bits())
                }
            }
            Value::Text(s) => GroupKey::Text(s),
            Value::Blob(bytes) => GroupKey::Blob(bytes),
        }
    }
}

/// Whether every non-null value of the column is distinct and there is one per row.
///
/// A column containing any null can therefore never be row-unique.
pub(crate) fn is_row_unique(relation: &Relation, column: usize) -> bool {
    let mut seen = HashSet::with_capacity(relation.row_count());
    for value in relation.column_values(column) {
        if value.is_null() {
            return false;
        }
        if !seen.insert(GroupKey::from(value)) {
            return false;
        }
    }
    true
}

/// Whether any two rows share the same combination of values in `columns`.
///
/// Nulls compare equal to each other here.
pub(crate) fn has_duplicates(relation: &Relation, columns: &[usize]) -> bool {
    let mut seen = HashSet::with_capacity(relation.row_count());
    relation.rows().iter().any(|row| {
        let key: Vec<GroupKey<'_>> = columns.iter().map(|&i| GroupKey::from(&row[i])).collect();
        !seen.insert(key)
    })
}

/// Tests `determinant -> dependent` over the given rows.
///
/// Every group of rows sharing a determinant key must carry exactly one
/// dependent value. At least one group must exist; an empty row set never
/// establishes a dependency.
pub(crate) fn determines<'a, I>(rows: I, determinant: &[usize], dependent: usize) -> bool
where
    I: IntoIterator<Item = &'a Vec<Value>>,
{
    let mut groups: HashMap<Vec<GroupKey<'a>>, GroupKey<'a>> = HashMap::new();
    for row in rows {
        let key: Vec<GroupKey<'a>> = determinant.iter().map(|&i| GroupKey::from(&row[i])).collect();
        let value = GroupKey::from(&row[dependent]);
        match groups.get(&key) {
            Some(existing) if *existing != value => return false,
            Some(_) => {}
            None => {
                groups.insert(key, value);
            }
        }
    }
    !groups.is_empty()
}

/// Whether every dependent value can be rebuilt by joining on `determinant`.
///
/// A row with a null anywhere in the determinant cannot be joined back, so its
/// dependent must be null too. Rows sharing a determinant key must agree on
/// the dependent, nulls included.
pub(crate) fn is_recoverable(relation: &Relation, determinant: &[usize], dependent: usize) -> bool {
    let mut groups: HashMap<Vec<GroupKey<'_>>, GroupKey<'_>> = HashMap::new();
    for row in relation.rows() {
        let value = GroupKey::from(&row[dependent]);
        if determinant.iter().any(|&i| row[i].is_null()) {
            if value != GroupKey::Null {
                return false;
            }
            continue;
        }
        let key: Vec<GroupKey<'_>> = determinant.iter().map(|&i| GroupKey::from(&row[i])).collect();
        match groups.get(&key) {
            Some(existing) if *existing != value => return false,
            Some(_) => {}
            None => {
                groups.insert(key, value);
            }
        }
    }
    true
}

/// Rows with no null in any of `columns`.
pub(crate) fn non_null_rows<'a>(
    relation: &'a Relation,
    columns: &'a [usize],
) -> impl Iterator<Item = &'a Vec<Value>> + 'a {
    relation
        .rows()
        .iter()
        .filter(move |row| columns.iter().all(|&i| !row[i].is_null()))
}
