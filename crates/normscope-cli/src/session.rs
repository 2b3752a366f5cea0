//! Interactive session state.
//!
//! A [`Session`] owns the table list, the selected table and that table's
//! latest report. Commands are applied one at a time through
//! [`Session::handle`]; detection is re-run whenever the selection changes,
//! on refresh and after every fix.

use crate::decomposer::{fix, inspect, partition_tables, FixOutcome};
use crate::output::TableReport;
use crate::source::{SourceError, TableSource};
use normscope_core::{DecomposeOptions, NormalForm};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("the database has no tables with usable names")]
    NoTables,

    #[error("unknown table '{0}'")]
    UnknownTable(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select(String),
    Next,
    Refresh,
    Fix(NormalForm),
    Tables,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let argument = words.next();
        if words.next().is_some() {
            return Err(format!("too many arguments in '{}'", s.trim()));
        }

        match (command.as_str(), argument) {
            ("select" | "use", Some(table)) => Ok(SessionCommand::Select(table.to_string())),
            ("select" | "use", None) => Err("usage: select <table>".to_string()),
            ("next" | "n", None) => Ok(SessionCommand::Next),
            ("refresh" | "r", None) => Ok(SessionCommand::Refresh),
            ("fix", Some(form)) => form.parse().map(SessionCommand::Fix),
            ("fix", None) => Err("usage: fix 1nf|2nf|3nf".to_string()),
            ("tables" | "ls", None) => Ok(SessionCommand::Tables),
            ("quit" | "exit" | "q", None) => Ok(SessionCommand::Quit),
            ("next" | "n" | "refresh" | "r" | "tables" | "ls" | "quit" | "exit" | "q", Some(_)) => {
                Err(format!("'{command}' takes no argument"))
            }
            ("", None) => Err("empty command".to_string()),
            (other, _) => Err(format!(
                "unknown command '{other}' (expected select, next, refresh, fix, tables or quit)"
            )),
        }
    }
}

/// What a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The selection changed and the new table was analyzed.
    Selected(TableReport),
    /// The selected table was analyzed again.
    Refreshed(TableReport),
    /// A fix ran; `report` is the fresh analysis afterwards.
    Fixed {
        outcome: FixOutcome,
        report: TableReport,
    },
    /// The requested form had no violations left.
    NothingToFix { table: String, form: NormalForm },
    Tables { tables: Vec<String>, selected: String },
    Quit,
}

/// Settings fixed for the lifetime of a session.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub decompose: DecomposeOptions,
    pub preview_rows: usize,
}

#[derive(Debug)]
pub struct Session {
    tables: Vec<String>,
    /// Tables left out because their names cannot be used in statements.
    unusable: Vec<String>,
    selected: usize,
    report: TableReport,
    options: SessionOptions,
}

impl Session {
    /// Lists the tables, selects the first one and analyzes it.
    ///
    /// Tables whose names fail identifier validation are not selectable; see
    /// [`Session::unusable_tables`].
    pub fn start<S: TableSource + ?Sized>(
        source: &mut S,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let (tables, unusable) = load_tables(source)?;
        let Some(first) = tables.first() else {
            return Err(SessionError::NoTables);
        };
        let report = inspect(source, first, options.preview_rows)?;

        Ok(Self {
            tables,
            unusable,
            selected: 0,
            report,
            options,
        })
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn unusable_tables(&self) -> &[String] {
        &self.unusable
    }

    pub fn selected(&self) -> &str {
        &self.tables[self.selected]
    }

    /// Latest analysis of the selected table.
    pub fn report(&self) -> &TableReport {
        &self.report
    }

    pub fn handle<S: TableSource + ?Sized>(
        &mut self,
        source: &mut S,
        command: SessionCommand,
    ) -> Result<SessionEvent, SessionError> {
        debug!(?command, table = self.selected(), "session command");

        match command {
            SessionCommand::Select(table) => {
                let index = self
                    .tables
                    .iter()
                    .position(|name| *name == table)
                    .ok_or(SessionError::UnknownTable(table))?;
                self.select(source, index)?;
                Ok(SessionEvent::Selected(self.report.clone()))
            }
            SessionCommand::Next => {
                let index = (self.selected + 1) % self.tables.len();
                self.select(source, index)?;
                Ok(SessionEvent::Selected(self.report.clone()))
            }
            SessionCommand::Refresh => {
                self.refresh(source)?;
                Ok(SessionEvent::Refreshed(self.report.clone()))
            }
            SessionCommand::Fix(form) => {
                let table = self.selected().to_string();
                let outcome = fix(source, &table, form, None, &self.options.decompose)?;
                self.refresh(source)?;
                if outcome.is_noop() && outcome.skipped.is_empty() {
                    return Ok(SessionEvent::NothingToFix { table, form });
                }
                // Child tables are new tables.
                (self.tables, self.unusable) = load_tables(source)?;
                self.selected = self
                    .tables
                    .iter()
                    .position(|name| *name == table)
                    .unwrap_or(0);
                Ok(SessionEvent::Fixed {
                    outcome,
                    report: self.report.clone(),
                })
            }
            SessionCommand::Tables => Ok(SessionEvent::Tables {
                tables: self.tables.clone(),
                selected: self.selected().to_string(),
            }),
            SessionCommand::Quit => Ok(SessionEvent::Quit),
        }
    }

    fn select<S: TableSource + ?Sized>(
        &mut self,
        source: &mut S,
        index: usize,
    ) -> Result<(), SessionError> {
        let report = inspect(source, &self.tables[index], self.options.preview_rows)?;
        self.selected = index;
        self.report = report;
        Ok(())
    }

    fn refresh<S: TableSource + ?Sized>(&mut self, source: &mut S) -> Result<(), SessionError> {
        self.select(source, self.selected)
    }
}

fn load_tables<S: TableSource + ?Sized>(
    source: &mut S,
) -> Result<(Vec<String>, Vec<String>), SessionError> {
    let (tables, unusable) = partition_tables(source.list_tables()?);
    for table in &unusable {
        warn!(table = %table, "table name is not a plain identifier, leaving it out");
    }
    Ok((tables, unusable))
}
