//! End-to-end tests for the `normscope` binary.

mod common;

use common::{Fixture, ENROLLMENT, ORDERS};
use std::io::Write;
use std::process::{Command, Stdio};

fn normscope() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_normscope"));
    command.env_remove("NORMSCOPE_LOG");
    command
}

#[test]
fn test_clean_table_exits_zero() {
    let fixture = Fixture::new(
        "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT);
         INSERT INTO people VALUES (1, 'ann');
         INSERT INTO people VALUES (2, 'bob');",
    );

    let output = normscope()
        .arg(fixture.path_str())
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(stdout.contains("Table: people"), "{stdout}");
    assert!(stdout.contains("0 with violations"), "{stdout}");
}

#[test]
fn test_violations_exit_one_with_json() {
    let fixture = Fixture::new(ORDERS);

    let output = normscope()
        .args(["-f", "json", "--preview", "1", fixture.path_str()])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let table = &json["tables"][0];
    assert_eq!(table["table"], "orders");
    assert_eq!(table["rowCount"], 4);
    assert_eq!(table["primaryKey"][0], "OrderID");
    assert_eq!(table["violations"]["firstNormalForm"][0], "Items");
    assert_eq!(table["preview"].as_array().map(Vec::len), Some(1));
}

#[test]
fn test_unusable_table_name_is_skipped_with_warning() {
    let fixture = Fixture::new(&format!(
        "CREATE TABLE \"order items\" (id INTEGER PRIMARY KEY, v TEXT);\n{ORDERS}"
    ));

    let output = normscope()
        .args(["-f", "json", fixture.path_str()])
        .output()
        .expect("run CLI");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "{stderr}");
    assert!(
        stderr.contains("normscope: warning: skipping table 'order items'"),
        "{stderr}"
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let tables = json["tables"].as_array().expect("tables array");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["table"], "orders");
}

#[test]
fn test_missing_database_is_a_config_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.db");

    let output = normscope()
        .arg(missing.to_str().expect("path"))
        .output()
        .expect("run CLI");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(66), "{stderr}");
    assert!(stderr.contains("normscope: error:"), "{stderr}");
    assert!(stderr.contains("does not exist"), "{stderr}");
    assert!(!missing.exists(), "database must not be created");
}

#[test]
fn test_fix_then_report() {
    let fixture = Fixture::new(ORDERS);

    let output = normscope()
        .args(["--fix", "1nf", "-t", "orders", fixture.path_str()])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stdout: {stdout}\nstderr: {stderr}");
    assert!(stderr.contains("1NF fix on orders: created orders_Items_1nf"), "{stderr}");
    assert!(stdout.contains("1NF  ok"), "{stdout}");
    assert_eq!(fixture.tables(), vec!["orders", "orders_Items_1nf"]);
}

#[test]
fn test_dry_run_leaves_database_untouched() {
    let fixture = Fixture::new(ENROLLMENT);

    let output = normscope()
        .args(["--fix", "2nf", "--dry-run", fixture.path_str()])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1), "{stdout}");
    assert!(stdout.contains("Planned 2NF migration:"), "{stdout}");
    assert!(
        stdout.contains("CREATE TABLE \"enrollment_Department_2nf\""),
        "{stdout}"
    );
    assert_eq!(fixture.tables(), vec!["enrollment"]);
}

#[test]
fn test_unsafe_table_name_is_rejected() {
    let fixture = Fixture::new(ORDERS);

    let output = normscope()
        .args(["-t", "orders; DROP TABLE orders", fixture.path_str()])
        .output()
        .expect("run CLI");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(66), "{stderr}");
    assert!(stderr.contains("Unsafe identifier"), "{stderr}");
    assert_eq!(fixture.count("orders"), 4);
}

#[test]
fn test_output_file() {
    let fixture = Fixture::new(ORDERS);
    let dir = tempfile::tempdir().expect("temp dir");
    let out_path = dir.path().join("report.json");

    let output = normscope()
        .args([
            "-f",
            "json",
            "-c",
            "-o",
            out_path.to_str().expect("path"),
            fixture.path_str(),
        ])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let written = std::fs::read_to_string(&out_path).expect("read report");
    assert!(!written.contains('\n'));
    assert!(written.contains("\"firstNormalForm\":[\"Items\"]"));
}

#[test]
fn test_interactive_session() {
    let fixture = Fixture::new(ORDERS);

    let mut child = normscope()
        .args(["--interactive", fixture.path_str()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn CLI");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"bogus\nfix 1nf\ntables\nquit\n")
        .expect("write commands");
    let output = child.wait_with_output().expect("wait");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stdout: {stdout}\nstderr: {stderr}");
    assert!(stderr.contains("unknown command 'bogus'"), "{stderr}");
    assert!(stdout.contains("1NF fix on orders: created orders_Items_1nf"), "{stdout}");
    assert!(stdout.contains("* orders\n"), "{stdout}");
    assert!(stdout.contains("  orders_Items_1nf\n"), "{stdout}");
}
