//! Normal form violation detection.
//!
//! Every function here is a pure pass over an already materialized
//! [`Relation`]; nothing is cached between calls.
//!
//! - [`detect_1nf`]: columns storing delimiter-joined lists.
//! - [`detect_2nf`]: non-key attributes determined by part of a composite key.
//! - [`detect_3nf`]: non-key attributes determined by another non-key attribute.
//!
//! Dependency mining is heuristic and exact-match: a dependency is reported
//! when it holds in the snapshot, not because it is declared anywhere.

mod first;
pub(crate) mod grouping;
mod second;
mod third;

pub use first::{detect_1nf, find_multivalued_columns, LIST_DELIMITERS};
pub use second::{detect_2nf, find_partial_dependencies};
pub use third::{detect_3nf, find_transitive_dependencies};

use crate::types::{Relation, ViolationReport};

/// Runs all three detectors over one snapshot.
///
/// Key columns are left out of the 1NF list: a key value is an identifier,
/// not a list, even when it contains a delimiter.
pub fn analyze(relation: &Relation, primary_keys: &[String]) -> ViolationReport {
    let mut first_normal_form = detect_1nf(relation);
    first_normal_form.retain(|column| !primary_keys.contains(column));
    ViolationReport {
        first_normal_form,
        second_normal_form: detect_2nf(relation, primary_keys),
        third_normal_form: detect_3nf(relation, primary_keys),
    }
}

/// Column indices eligible for dependency search, in column order.
///
/// Excludes primary key columns, multi-valued columns and anything listed in
/// `excluded`.
fn non_prime_columns(relation: &Relation, primary_keys: &[String], excluded: &[String]) -> Vec<usize> {
    let multivalued = find_multivalued_columns(relation);
    relation
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            !primary_keys.contains(name) && !multivalued.contains(name) && !excluded.contains(name)
        })
        .map(|(index, _)| index)
        .collect()
}
