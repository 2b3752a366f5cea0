//! Detection results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An empirical functional dependency `determinant -> dependent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct FunctionalDependency {
    pub determinant: Vec<String>,
    pub dependent: String,
}

impl FunctionalDependency {
    pub fn new<I, S>(determinant: I, dependent: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            determinant: determinant.into_iter().map(Into::into).collect(),
            dependent: dependent.into(),
        }
    }

    /// Whether every determinant column of `other` is also one of ours, and ours is larger.
    pub fn has_smaller_determinant(&self, other: &FunctionalDependency) -> bool {
        other.determinant.len() < self.determinant.len()
            && other
                .determinant
                .iter()
                .all(|column| self.determinant.contains(column))
    }
}

impl fmt::Display for FunctionalDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.determinant.as_slice() {
            [single] => write!(f, "{single} -> {}", self.dependent),
            columns => write!(f, "({}) -> {}", columns.join(","), self.dependent),
        }
    }
}

/// Normal form violations found in one relation snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViolationReport {
    /// Columns holding delimiter-joined values.
    pub first_normal_form: Vec<String>,
    /// Partial dependencies on a proper subset of the primary key.
    pub second_normal_form: Vec<String>,
    /// Dependencies between non-key attributes.
    pub third_normal_form: Vec<String>,
}

impl ViolationReport {
    pub fn is_clean(&self) -> bool {
        self.first_normal_form.is_empty()
            && self.second_normal_form.is_empty()
            && self.third_normal_form.is_empty()
    }

    pub fn total(&self) -> usize {
        self.first_normal_form.len() + self.second_normal_form.len() + self.third_normal_form.len()
    }
}
