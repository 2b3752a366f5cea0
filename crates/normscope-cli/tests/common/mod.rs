#![allow(dead_code)]

use normscope_cli::SqliteSource;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// A throwaway SQLite database seeded with `setup`.
pub struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    pub fn new(setup: &str) -> Self {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("test.db");
        let conn = Connection::open(&path).expect("open sqlite");
        conn.execute_batch(setup).expect("seed database");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("utf-8 path")
    }

    pub fn source(&self) -> SqliteSource {
        SqliteSource::open(self.path_str()).expect("open source")
    }

    fn conn(&self) -> Connection {
        Connection::open(&self.path).expect("open sqlite")
    }

    pub fn tables(&self) -> Vec<String> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .expect("prepare");
        stmt.query_map([], |row| row.get(0))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows")
    }

    /// `(name, declared type, not null, default)` per column.
    pub fn columns(&self, table: &str) -> Vec<(String, String, bool, Option<String>)> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info(\"{table}\")"))
            .expect("prepare");
        stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)? != 0,
                row.get::<_, Option<String>>(4)?,
            ))
        })
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows")
    }

    pub fn column_names(&self, table: &str) -> Vec<String> {
        self.columns(table).into_iter().map(|c| c.0).collect()
    }

    pub fn count(&self, table: &str) -> i64 {
        self.conn()
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))
            .expect("count")
    }

    /// Every row of a two-column projection, ordered.
    pub fn pairs(&self, sql: &str) -> Vec<(String, String)> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql).expect("prepare");
        stmt.query_map([], |row| {
            let first: rusqlite::types::Value = row.get(0)?;
            let second: rusqlite::types::Value = row.get(1)?;
            Ok((render(first), render(second)))
        })
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows")
    }
}

fn render(value: rusqlite::types::Value) -> String {
    use rusqlite::types::Value;
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(v) => v,
        Value::Blob(v) => format!("{v:?}"),
    }
}

pub const ORDERS: &str = "
    CREATE TABLE orders (
        OrderID INTEGER PRIMARY KEY,
        Items TEXT,
        Customer TEXT NOT NULL DEFAULT 'guest'
    );
    INSERT INTO orders VALUES (1, 'apple, banana, cherry', 'ann');
    INSERT INTO orders VALUES (2, 'durian', 'bob');
    INSERT INTO orders VALUES (3, 'elder,fig', 'cid');
    INSERT INTO orders VALUES (4, NULL, 'dan');
";

pub const ENROLLMENT: &str = "
    CREATE TABLE enrollment (
        StudentID INTEGER NOT NULL,
        CourseID INTEGER NOT NULL,
        Department TEXT,
        Grade TEXT,
        PRIMARY KEY (StudentID, CourseID)
    );
    INSERT INTO enrollment VALUES (1, 101, 'Math', 'A');
    INSERT INTO enrollment VALUES (1, 102, 'Math', 'B');
    INSERT INTO enrollment VALUES (2, 101, 'Physics', 'B');
    INSERT INTO enrollment VALUES (2, 103, 'Physics', 'C');
    INSERT INTO enrollment VALUES (3, 102, 'Math', 'A');
";

pub const ADDRESSES: &str = "
    CREATE TABLE addresses (
        id INTEGER PRIMARY KEY,
        Street TEXT NOT NULL,
        ZipCode VARCHAR(10) NOT NULL,
        City TEXT DEFAULT 'unknown'
    );
    INSERT INTO addresses VALUES (1, 'Main St', '10001', 'New York');
    INSERT INTO addresses VALUES (2, 'Oak Ave', '10001', 'New York');
    INSERT INTO addresses VALUES (3, 'Elm Rd', '60601', 'Chicago');
";
