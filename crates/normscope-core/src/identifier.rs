//! Identifier safety for generated statements.
//!
//! Table and column names end up interpolated into DDL, so they are checked
//! against a conservative character set before any statement is built.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A name rejected before it could reach a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Unsafe identifier '{0}': only letters, digits and underscores are allowed")]
    Unsafe(String),

    #[error("Unsafe declared type '{0}'")]
    UnsafeType(String),
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Invalid regex pattern"))
}

fn declared_type_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Covers forms such as `VARCHAR(20)`, `DECIMAL(10, 2)`, `UNSIGNED BIG INT`.
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_ (),.+-]*$").expect("Invalid regex pattern"))
}

/// Accepts `name` only if it is made of ASCII letters, digits and underscores.
pub fn validate_identifier(name: &str) -> Result<&str, IdentifierError> {
    if identifier_pattern().is_match(name) {
        Ok(name)
    } else {
        Err(IdentifierError::Unsafe(name.to_string()))
    }
}

/// Validates and double-quotes an identifier.
pub fn quote_identifier(name: &str) -> Result<String, IdentifierError> {
    validate_identifier(name).map(|name| format!("\"{name}\""))
}

/// Accepts a declared column type for verbatim interpolation.
///
/// `--` is rejected even though each `-` is allowed on its own, since it
/// would start an SQL comment.
pub fn validate_declared_type(declared: &str) -> Result<&str, IdentifierError> {
    if declared_type_pattern().is_match(declared) && !declared.contains("--") {
        Ok(declared)
    } else {
        Err(IdentifierError::UnsafeType(declared.to_string()))
    }
}

/// Child table holding the split values of a multi-valued column.
pub fn multivalued_child_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_1nf")
}

/// Child table holding a decomposed dependency.
pub fn dependency_child_name(table: &str, dependent: &str, suffix: &str) -> String {
    format!("{table}_{dependent}_{suffix}")
}

/// Temporary name the parent table is parked under while it is rebuilt.
pub fn aside_name(table: &str) -> String {
    format!("{table}__old")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_identifiers() {
        assert_eq!(validate_identifier("orders_2024"), Ok("orders_2024"));
        assert_eq!(quote_identifier("Items"), Ok("\"Items\"".to_string()));
    }

    #[test]
    fn test_rejects_injection_attempts() {
        for name in [
            "",
            "orders; DROP TABLE users",
            "order-items",
            "\"quoted\"",
            "name with space",
            "tbl\n",
        ] {
            assert_eq!(
                validate_identifier(name),
                Err(IdentifierError::Unsafe(name.to_string())),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_declared_types() {
        assert!(validate_declared_type("VARCHAR(20)").is_ok());
        assert!(validate_declared_type("DECIMAL(10, 2)").is_ok());
        assert!(validate_declared_type("").is_ok());
        assert!(validate_declared_type("TEXT); DROP TABLE x; --").is_err());
    }

    #[test]
    fn test_declared_type_rejects_comment_marker() {
        assert!(validate_declared_type("NUMERIC(-1, 2)").is_ok());
        assert_eq!(
            validate_declared_type("INTEGER --"),
            Err(IdentifierError::UnsafeType("INTEGER --".to_string()))
        );
        assert!(validate_declared_type("TEXT--x").is_err());
    }

    #[test]
    fn test_child_names() {
        assert_eq!(multivalued_child_name("orders", "Items"), "orders_Items_1nf");
        assert_eq!(
            dependency_child_name("students", "Department", "2nf"),
            "students_Department_2nf"
        );
        assert_eq!(aside_name("orders"), "orders__old");
    }
}
