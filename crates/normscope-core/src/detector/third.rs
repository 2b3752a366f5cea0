//! Third normal form: dependencies between non-key attributes.

use super::grouping::{determines, is_row_unique, non_null_rows};
use super::non_prime_columns;
use crate::types::{FunctionalDependency, Relation};
use std::collections::HashSet;
#[cfg(feature = "tracing")]
use tracing::debug;

/// Mines single-column dependencies `X -> Y` among non-prime attributes and
/// reduces them to a minimal set.
///
/// Candidate pairs are visited as ordered permutations in declared column
/// order. Row-unique determinants are skipped. When both directions of a pair
/// pass, only the first one visited is kept. A dependency `X -> Z` is dropped
/// when some `Y` gives both `X -> Y` and `Y -> Z`.
pub fn find_transitive_dependencies(
    relation: &Relation,
    primary_keys: &[String],
) -> Vec<FunctionalDependency> {
    let candidates = non_prime_columns(relation, primary_keys, &[]);

    let mut accepted: Vec<(usize, usize)> = Vec::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();

    for &x in &candidates {
        if is_row_unique(relation, x) {
            continue;
        }
        for &y in &candidates {
            if x == y || seen.contains(&(y, x)) {
                continue;
            }
            let pair = [x, y];
            if determines(non_null_rows(relation, &pair), &[x], y) {
                seen.insert((x, y));
                accepted.push((x, y));
            }
        }
    }

    let mut minimal: Vec<(usize, usize)> = accepted
        .iter()
        .copied()
        .filter(|&(x, z)| {
            let implied = candidates.iter().any(|&y| {
                y != x && y != z && seen.contains(&(x, y)) && seen.contains(&(y, z))
            });

            #[cfg(feature = "tracing")]
            if implied {
                debug!(
                    determinant = %relation.columns()[x],
                    dependent = %relation.columns()[z],
                    "pruned transitively implied dependency"
                );
            }

            !implied
        })
        .collect();

    let columns = relation.columns();
    minimal.sort_by(|a, b| (&columns[a.0], &columns[a.1]).cmp(&(&columns[b.0], &columns[b.1])));

    minimal
        .into_iter()
        .map(|(x, z)| FunctionalDependency::new([columns[x].clone()], columns[z].clone()))
        .collect()
}

/// Rendered 3NF violations, sorted.
pub fn detect_3nf(relation: &Relation, primary_keys: &[String]) -> Vec<String> {
    find_transitive_dependencies(relation, primary_keys)
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn text_rows(rows: &[&[&str]]) -> Vec<Vec<Value>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| Value::from(*cell)).collect())
            .collect()
    }

    #[test]
    fn test_keeps_first_direction_of_symmetric_pair() {
        let relation = Relation::from_rows(
            ["id", "ZipCode", "City"],
            text_rows(&[
                &["1", "10001", "New York"],
                &["2", "10001", "New York"],
                &["3", "60601", "Chicago"],
            ]),
        )
        .expect("relation");

        let keys = vec!["id".to_string()];
        assert_eq!(detect_3nf(&relation, &keys), vec!["ZipCode -> City"]);
    }

    #[test]
    fn test_column_order_decides_symmetric_tie() {
        let relation = Relation::from_rows(
            ["id", "City", "ZipCode"],
            text_rows(&[
                &["1", "New York", "10001"],
                &["2", "New York", "10001"],
                &["3", "Chicago", "60601"],
            ]),
        )
        .expect("relation");

        let keys = vec!["id".to_string()];
        assert_eq!(detect_3nf(&relation, &keys), vec!["City -> ZipCode"]);
    }

    #[test]
    fn test_skips_row_unique_determinant() {
        let relation = Relation::from_rows(
            ["id", "email", "plan"],
            text_rows(&[
                &["1", "a@x", "free"],
                &["2", "b@x", "free"],
                &["3", "c@x", "pro"],
            ]),
        )
        .expect("relation");

        let keys = vec!["id".to_string()];
        // email is unique; plan -> email fails because "free" maps to two emails.
        assert!(detect_3nf(&relation, &keys).is_empty());
    }

    #[test]
    fn test_prunes_two_hop_dependency() {
        let relation = Relation::from_rows(
            ["id", "Employee", "Department", "Building"],
            text_rows(&[
                &["1", "ann", "sales", "north"],
                &["2", "ann", "sales", "north"],
                &["3", "bob", "ops", "south"],
                &["4", "bob", "ops", "south"],
                &["5", "cid", "ops", "south"],
                &["6", "dee", "hr", "south"],
            ]),
        )
        .expect("relation");

        let keys = vec!["id".to_string()];
        assert_eq!(
            detect_3nf(&relation, &keys),
            vec!["Department -> Building", "Employee -> Department"]
        );
    }

    #[test]
    fn test_empty_pool_yields_nothing() {
        let relation = Relation::from_rows(["id"], text_rows(&[&["1"], &["2"]])).expect("relation");
        let keys = vec!["id".to_string()];
        assert!(detect_3nf(&relation, &keys).is_empty());
    }

    #[test]
    fn test_null_rows_are_ignored_per_pair() {
        let relation = Relation::from_rows(
            ["id", "code", "label"],
            vec![
                vec![Value::Integer(1), Value::from("A"), Value::from("alpha")],
                vec![Value::Integer(2), Value::from("A"), Value::Null],
                vec![Value::Integer(3), Value::from("B"), Value::from("beta")],
                vec![Value::Integer(4), Value::Null, Value::from("beta")],
            ],
        )
        .expect("relation");

        let keys = vec!["id".to_string()];
        assert_eq!(detect_3nf(&relation, &keys), vec!["code -> label"]);
    }
}
