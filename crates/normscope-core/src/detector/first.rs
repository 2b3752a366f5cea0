//! First normal form: multi-valued columns.

use crate::types::Relation;

/// Characters that mark a value as a delimiter-joined list.
pub const LIST_DELIMITERS: [char; 4] = [',', ';', '|', '\n'];

/// Returns the columns whose values contain list delimiters, in column order.
///
/// Numeric columns are skipped. Any delimiter in any non-null value flags the
/// column; no attempt is made to tell real lists from text that happens to
/// contain a comma.
pub fn find_multivalued_columns(relation: &Relation) -> Vec<String> {
    relation
        .columns()
        .iter()
        .enumerate()
        .filter(|(index, _)| !relation.is_numeric_column(*index))
        .filter(|(index, _)| {
            relation.column_values(*index).any(|value| {
                value
                    .as_text()
                    .is_some_and(|text| text.contains(LIST_DELIMITERS))
            })
        })
        .map(|(_, name)| name.clone())
        .collect()
}

/// Alias of [`find_multivalued_columns`] named after the normal form it checks.
pub fn detect_1nf(relation: &Relation) -> Vec<String> {
    find_multivalued_columns(relation)
}
