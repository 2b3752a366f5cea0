//! SQLite source backed by SQLx.
//!
//! SQLx is async; the CLI is not. A private current-thread runtime drives the
//! single connection so callers see a blocking API.

use super::{SourceError, TableSource};
use normscope_core::identifier::quote_identifier;
use normscope_core::{ColumnInfo, MigrationPlan, Relation, TableSchema, Value};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row, TypeInfo, ValueRef};
use std::path::Path;
use std::str::FromStr;
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

/// A connection to one SQLite database.
pub struct SqliteSource {
    runtime: Runtime,
    connection: SqliteConnection,
    location: String,
}

impl SqliteSource {
    /// Opens an existing database.
    ///
    /// `target` is either a file path or a `sqlite:` URL. A path that does not
    /// exist is a connection failure; the database is never created here.
    pub fn open(target: &str) -> Result<Self, SourceError> {
        let options = connect_options(target)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::Connection {
                target: target.to_string(),
                message: format!("failed to start runtime: {e}"),
            })?;

        let connection = runtime
            .block_on(options.connect())
            .map_err(|e| SourceError::Connection {
                target: target.to_string(),
                message: e.to_string(),
            })?;

        info!(database = target, "connected");
        Ok(Self {
            runtime,
            connection,
            location: target.to_string(),
        })
    }

    /// The path or URL this source was opened with.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Runs a read without caching the prepared statement; table shapes
    /// change under fixes.
    fn fetch_all(&mut self, sql: &str) -> Result<Vec<SqliteRow>, sqlx::Error> {
        let connection = &mut self.connection;
        self.runtime
            .block_on(sqlx::query(sql).persistent(false).fetch_all(connection))
    }
}

fn connect_options(target: &str) -> Result<SqliteConnectOptions, SourceError> {
    if target.starts_with("sqlite:") {
        return SqliteConnectOptions::from_str(target).map_err(|e| SourceError::Connection {
            target: target.to_string(),
            message: e.to_string(),
        });
    }

    let path = Path::new(target);
    if !path.is_file() {
        return Err(SourceError::Connection {
            target: target.to_string(),
            message: "database file does not exist".to_string(),
        });
    }

    Ok(SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false))
}

impl TableSource for SqliteSource {
    fn list_tables(&mut self) -> Result<Vec<String>, SourceError> {
        let rows = self.fetch_all(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
             ORDER BY name",
        )?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("name").map_err(SourceError::from))
            .collect()
    }

    fn table_schema(&mut self, table: &str) -> Result<TableSchema, SourceError> {
        let quoted = quote_identifier(table)?;
        let rows = self.fetch_all(&format!("PRAGMA table_info({quoted})"))?;
        if rows.is_empty() {
            return Err(SourceError::TableNotFound(table.to_string()));
        }

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.try_get("name")?;
            let declared: String = row.try_get("type")?;
            let not_null: i64 = row.try_get("notnull")?;
            let default_value: Option<String> = row.try_get("dflt_value")?;
            let primary_key: i64 = row.try_get("pk")?;

            let mut column = ColumnInfo::new(name, Some(declared.as_str()).filter(|t| !t.is_empty()));
            column.not_null = not_null != 0;
            column.default_value = default_value;
            column.primary_key = u32::try_from(primary_key).unwrap_or(0);
            columns.push(column);
        }

        Ok(TableSchema::new(table, columns))
    }

    fn read_relation(&mut self, table: &str) -> Result<Relation, SourceError> {
        let schema = self.table_schema(table)?;
        let quoted = quote_identifier(table)?;
        let rows = self.fetch_all(&format!("SELECT * FROM {quoted}"))?;

        let mut relation = Relation::new(schema.column_names())?;
        for row in &rows {
            let values = (0..relation.column_count())
                .map(|index| decode_value(row, index))
                .collect::<Result<Vec<_>, _>>()?;
            relation.push_row(values)?;
        }

        debug!(table, rows = relation.row_count(), "read snapshot");
        Ok(relation)
    }

    fn apply(&mut self, plan: &MigrationPlan) -> Result<(), SourceError> {
        if plan.is_empty() {
            return Ok(());
        }

        let connection = &mut self.connection;
        self.runtime.block_on(apply_in_transaction(connection, plan))
    }
}

async fn apply_in_transaction(
    connection: &mut SqliteConnection,
    plan: &MigrationPlan,
) -> Result<(), SourceError> {
    let mut tx = connection.begin().await?;
    match run_plan(&mut *tx, plan).await {
        Ok(()) => {
            tx.commit().await?;
            info!(table = %plan.table, form = %plan.form, "migration committed");
            Ok(())
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(table = %plan.table, error = %rollback, "rollback failed");
            }
            Err(err)
        }
    }
}

async fn run_plan(connection: &mut SqliteConnection, plan: &MigrationPlan) -> Result<(), SourceError> {
    for step in &plan.steps {
        debug!(table = %plan.table, step = %step.description, "running step");
        for statement in &step.statements {
            let mut query = sqlx::query(&statement.sql).persistent(!statement.params.is_empty());
            for value in &statement.params {
                query = bind_value(query, value);
            }
            query
                .execute(&mut *connection)
                .await
                .map_err(|source| SourceError::Migration {
                    table: plan.table.clone(),
                    step: step.description.clone(),
                    source,
                })?;
        }
    }
    Ok(())
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Integer(v) => query.bind(*v),
        Value::Real(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.as_str()),
        Value::Blob(v) => query.bind(v.as_slice()),
    }
}

/// Maps the storage class of one cell to a [`Value`].
///
/// SQLite is dynamically typed, so the cell's own type decides, not the
/// column's declared type.
fn decode_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage = raw.type_info().name().to_ascii_uppercase();

    let value = match storage.as_str() {
        "INTEGER" | "BIGINT" | "INT8" | "BOOLEAN" => Value::Integer(row.try_get_unchecked(index)?),
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => Value::Real(row.try_get_unchecked(index)?),
        "BLOB" => Value::Blob(row.try_get_unchecked(index)?),
        _ => Value::Text(row.try_get_unchecked(index)?),
    };
    Ok(value)
}
