//! Second normal form: partial dependencies on a composite primary key.

use super::grouping::{determines, has_duplicates, non_null_rows};
use super::non_prime_columns;
use super::third::find_transitive_dependencies;
use crate::types::{FunctionalDependency, Relation};
#[cfg(feature = "tracing")]
use tracing::debug;

/// Finds non-prime attributes determined by a proper subset of the primary key.
///
/// Only applies to composite keys. Attributes already explained by a
/// transitive dependency are left to the 3NF search. For each dependent
/// attribute only the dependencies with a minimal determinant are kept.
pub fn find_partial_dependencies(
    relation: &Relation,
    primary_keys: &[String],
) -> Vec<FunctionalDependency> {
    if primary_keys.len() < 2 {
        return Vec::new();
    }

    let key_indices: Option<Vec<usize>> = primary_keys
        .iter()
        .map(|key| relation.column_index(key))
        .collect();
    let Some(key_indices) = key_indices else {
        return Vec::new();
    };

    let claimed: Vec<String> = find_transitive_dependencies(relation, primary_keys)
        .into_iter()
        .map(|fd| fd.dependent)
        .collect();
    let candidates = non_prime_columns(relation, primary_keys, &claimed);

    let mut found: Vec<FunctionalDependency> = Vec::new();
    for size in 1..key_indices.len() {
        for subset in combinations(&key_indices, size) {
            if !has_duplicates(relation, &subset) {
                continue;
            }

            let filter: Vec<usize> = subset.iter().chain(candidates.iter()).copied().collect();
            let rows: Vec<_> = non_null_rows(relation, &filter).collect();

            for &attribute in &candidates {
                if determines(rows.iter().copied(), &subset, attribute) {
                    found.push(FunctionalDependency::new(
                        subset.iter().map(|&i| relation.columns()[i].clone()),
                        relation.columns()[attribute].clone(),
                    ));
                }
            }
        }
    }

    let mut minimal: Vec<FunctionalDependency> = found
        .iter()
        .filter(|fd| {
            let redundant = found
                .iter()
                .any(|other| other.dependent == fd.dependent && fd.has_smaller_determinant(other));

            #[cfg(feature = "tracing")]
            if redundant {
                debug!(dependency = %fd, "pruned partial dependency with a wider determinant");
            }

            !redundant
        })
        .cloned()
        .collect();

    minimal.sort_by_cached_key(ToString::to_string);
    minimal.dedup();
    minimal
}

/// Rendered 2NF violations, sorted and deduplicated.
pub fn detect_2nf(relation: &Relation, primary_keys: &[String]) -> Vec<String> {
    find_partial_dependencies(relation, primary_keys)
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// All `size`-element combinations of `items`, preserving input order.
fn combinations(items: &[usize], size: usize) -> Vec<Vec<usize>> {
    fn extend(
        items: &[usize],
        size: usize,
        start: usize,
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i]);
            extend(items, size, i + 1, current, out);
            current.pop();
        }
    }

    let mut out = Vec::new();
    extend(items, size, 0, &mut Vec::with_capacity(size), &mut out);
    out
}
