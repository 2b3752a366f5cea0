//! CLI argument parsing using clap.

use clap::{ArgAction, Parser, ValueEnum};
use normscope_core::{DecomposeOptions, NormalForm, TypePolicy};
use std::path::PathBuf;

/// normscope - normal form analyzer for SQLite tables
#[derive(Parser, Debug)]
#[command(name = "normscope")]
#[command(about = "Detect and fix 1NF/2NF/3NF violations in SQLite tables", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQLite database file or `sqlite:` URL
    #[arg(value_name = "DATABASE")]
    pub database: String,

    /// Table to analyze (can be repeated; defaults to every table)
    #[arg(short, long = "table", value_name = "TABLE")]
    pub tables: Vec<String>,

    /// Decompose tables to remove violations of a normal form: 1nf, 2nf or 3nf
    /// (can be repeated; applied in normal form order)
    #[arg(long, value_name = "FORM")]
    pub fix: Vec<NormalForm>,

    /// Print the migration SQL for --fix instead of executing it
    #[arg(long, requires = "fix")]
    pub dry_run: bool,

    /// Declare every column of 2NF/3NF decompositions as TEXT instead of
    /// keeping declared types and constraints
    #[arg(long)]
    pub generic_types: bool,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Suppress status messages on stderr
    #[arg(short, long)]
    pub quiet: bool,

    /// Show the first N rows of each table
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub preview: usize,

    /// Read commands from stdin (select, next, refresh, fix, tables, quit)
    #[arg(short, long, conflicts_with_all = ["fix", "dry_run", "tables"])]
    pub interactive: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn decompose_options(&self) -> DecomposeOptions {
        DecomposeOptions {
            type_policy: if self.generic_types {
                TypePolicy::GenericText
            } else {
                TypePolicy::Preserve
            },
        }
    }

    /// Requested fixes, deduplicated, in normal form order.
    pub fn fix_forms(&self) -> Vec<NormalForm> {
        let mut forms = self.fix.clone();
        forms.sort();
        forms.dedup();
        forms
    }
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_forms_are_ordered() {
        let args = Args::parse_from(["normscope", "db.sqlite", "--fix", "3nf", "--fix", "1", "--fix", "3NF"]);
        assert_eq!(args.fix_forms(), vec![NormalForm::First, NormalForm::Third]);
        assert_eq!(args.decompose_options().type_policy, TypePolicy::Preserve);
    }

    #[test]
    fn test_generic_types_flag() {
        let args = Args::parse_from(["normscope", "db.sqlite", "--generic-types", "-vv"]);
        assert_eq!(args.decompose_options().type_policy, TypePolicy::GenericText);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_invalid_form_is_rejected() {
        assert!(Args::try_parse_from(["normscope", "db.sqlite", "--fix", "bcnf"]).is_err());
    }

    #[test]
    fn test_dry_run_requires_fix() {
        assert!(Args::try_parse_from(["normscope", "db.sqlite", "--dry-run"]).is_err());
    }
}
