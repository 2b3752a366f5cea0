//! Human-readable output formatting.

use super::TableReport;
use crate::decomposer::FixOutcome;
use crate::session::SessionEvent;
use normscope_core::{MigrationPlan, NormalForm, Value};
use owo_colors::OwoColorize;
use std::fmt::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Format the table reports as human-readable text with optional colors.
pub fn format_report(reports: &[TableReport], colored: bool) -> String {
    let mut out = String::new();

    write_header(&mut out, colored);
    for report in reports {
        write_table(&mut out, report, colored);
    }
    write_summary(&mut out, reports, colored);

    out
}

/// Render the SQL of a migration plan, one statement per line.
pub fn format_plan(plan: &MigrationPlan) -> String {
    let mut out = String::new();
    for step in &plan.steps {
        writeln!(out, "-- {}", step.description).unwrap();
        for statement in &step.statements {
            if statement.params.is_empty() {
                writeln!(out, "{};", statement.sql).unwrap();
            } else {
                let params: Vec<String> = statement.params.iter().map(render_param).collect();
                writeln!(out, "{}; -- [{}]", statement.sql, params.join(", ")).unwrap();
            }
        }
    }
    out
}

/// Format the result of one interactive command.
pub fn format_event(event: &SessionEvent, colored: bool) -> String {
    let mut out = String::new();
    match event {
        SessionEvent::Selected(report) | SessionEvent::Refreshed(report) => {
            write_table(&mut out, report, colored);
        }
        SessionEvent::Fixed { outcome, report } => {
            write_fix(&mut out, outcome, colored);
            writeln!(out).unwrap();
            write_table(&mut out, report, colored);
        }
        SessionEvent::NothingToFix { table, form } => {
            writeln!(out, "No {form} violations in {table}; nothing to fix.").unwrap();
        }
        SessionEvent::Tables { tables, selected } => {
            for table in tables {
                let marker = if table == selected { "*" } else { " " };
                writeln!(out, "{marker} {table}").unwrap();
            }
        }
        SessionEvent::Quit => {}
    }
    out
}

fn write_header(out: &mut String, colored: bool) {
    let title = "normscope Normal Form Analysis";
    let line = "═".repeat(50);

    if colored {
        writeln!(out, "{}", title.bold()).unwrap();
        writeln!(out, "{}", line.dimmed()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
        writeln!(out, "{line}").unwrap();
    }
    writeln!(out).unwrap();
}

fn write_table(out: &mut String, report: &TableReport, colored: bool) {
    let key = if report.primary_key.is_empty() {
        "none".to_string()
    } else {
        report.primary_key.join(", ")
    };
    let heading = format!("Table: {}", report.table);
    let details = format!("({} rows, primary key: {key})", report.row_count);

    if colored {
        writeln!(out, "{} {}", heading.bold(), details.dimmed()).unwrap();
    } else {
        writeln!(out, "{heading} {details}").unwrap();
    }

    for outcome in &report.fixes {
        write_fix(out, outcome, colored);
    }

    let sections = [
        (NormalForm::First, &report.violations.first_normal_form),
        (NormalForm::Second, &report.violations.second_normal_form),
        (NormalForm::Third, &report.violations.third_normal_form),
    ];
    for (form, found) in sections {
        write_violations(out, form, found, colored);
    }

    for plan in &report.plans {
        write_planned(out, plan, colored);
    }

    if !report.preview.is_empty() {
        write_preview(out, report);
    }

    writeln!(out).unwrap();
}

fn write_violations(out: &mut String, form: NormalForm, found: &[String], colored: bool) {
    if found.is_empty() {
        let status = "ok";
        if colored {
            writeln!(out, "  {form}  {}", status.green()).unwrap();
        } else {
            writeln!(out, "  {form}  {status}").unwrap();
        }
        return;
    }

    let label = match form {
        NormalForm::First => "multi-valued columns",
        NormalForm::Second => "partial dependencies",
        NormalForm::Third => "transitive dependencies",
    };
    let status = format!("{} {label}", found.len());
    if colored {
        writeln!(out, "  {form}  {}", status.red()).unwrap();
    } else {
        writeln!(out, "  {form}  {status}").unwrap();
    }
    for item in found {
        writeln!(out, "       {item}").unwrap();
    }
}

fn write_fix(out: &mut String, outcome: &FixOutcome, colored: bool) {
    let message = if outcome.is_noop() {
        format!("{} fix on {}: nothing to do", outcome.form, outcome.table)
    } else {
        format!(
            "{} fix on {}: created {}",
            outcome.form,
            outcome.table,
            outcome.child_tables.join(", ")
        )
    };

    if colored {
        writeln!(out, "  {}", message.cyan()).unwrap();
    } else {
        writeln!(out, "  {message}").unwrap();
    }

    for skipped in &outcome.skipped {
        writeln!(out, "    skipped {skipped}").unwrap();
    }
}

fn write_planned(out: &mut String, plan: &MigrationPlan, colored: bool) {
    let title = if plan.is_empty() {
        format!("  Planned {} migration: nothing to do", plan.form)
    } else {
        format!("  Planned {} migration:", plan.form)
    };
    if colored {
        writeln!(out, "{}", title.yellow()).unwrap();
    } else {
        writeln!(out, "{title}").unwrap();
    }
    for line in format_plan(plan).lines() {
        writeln!(out, "    {line}").unwrap();
    }
}

fn write_preview(out: &mut String, report: &TableReport) {
    let mut builder = Builder::default();
    builder.push_record(report.columns.iter().cloned());
    for row in &report.preview {
        builder.push_record(row.iter().map(Value::to_string));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    for line in table.to_string().lines() {
        writeln!(out, "  {line}").unwrap();
    }
}

fn write_summary(out: &mut String, reports: &[TableReport], colored: bool) {
    let failing = reports.iter().filter(|r| r.has_violations()).count();
    let total: usize = reports.iter().map(|r| r.violations.total()).sum();
    let stats = format!(
        "Summary: {} tables | {failing} with violations | {total} violations",
        reports.len()
    );

    if colored {
        if failing == 0 {
            writeln!(out, "{}", stats.green()).unwrap();
        } else {
            writeln!(out, "{}", stats.red()).unwrap();
        }
    } else {
        writeln!(out, "{stats}").unwrap();
    }
}

/// Renders a bound value for the trailing comment of a statement line.
///
/// Line breaks are escaped so the comment stays on one line.
fn render_param(value: &Value) -> String {
    match value {
        Value::Text(text) => format!(
            "'{}'",
            text.replace('\\', "\\\\")
                .replace('\'', "''")
                .replace('\n', "\\n")
                .replace('\r', "\\r")
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normscope_core::{
        analyze, plan_first_normal_form, ColumnInfo, DecomposeOptions, Relation, TableSchema,
    };

    fn orders() -> Relation {
        Relation::from_rows(
            ["OrderID", "Items"],
            vec![
                vec![Value::Integer(1), Value::from("apple,banana")],
                vec![Value::Integer(2), Value::from("cherry")],
            ],
        )
        .expect("relation")
    }

    fn report(preview_rows: usize) -> TableReport {
        let relation = orders();
        let keys = vec!["OrderID".to_string()];
        let violations = analyze(&relation, &keys);
        TableReport::new("orders", keys, &relation, violations, preview_rows)
    }

    #[test]
    fn test_report_lists_violations() {
        let out = format_report(&[report(0)], false);
        assert!(out.contains("Table: orders (2 rows, primary key: OrderID)"));
        assert!(out.contains("1NF  1 multi-valued columns"));
        assert!(out.contains("       Items"));
        assert!(out.contains("2NF  ok"));
        assert!(out.contains("Summary: 1 tables | 1 with violations | 1 violations"));
    }

    #[test]
    fn test_preview_renders_rows() {
        let out = format_report(&[report(1)], false);
        assert!(out.contains("OrderID"));
        assert!(out.contains("apple,banana"));
        assert!(!out.contains("cherry"));
    }

    #[test]
    fn test_plan_rendering_shows_parameters() {
        let schema = TableSchema::new(
            "orders",
            vec![
                ColumnInfo::new("OrderID", Some("INTEGER")).with_primary_key(1),
                ColumnInfo::new("Items", Some("TEXT")),
            ],
        );
        let plan = plan_first_normal_form(&schema, &orders(), &DecomposeOptions::default())
            .expect("plan");

        let sql = format_plan(&plan);
        assert!(sql.contains("-- drop previous orders_Items_1nf"));
        assert!(sql.contains("VALUES (?, ?); -- [1, 'apple']"));
        assert!(sql.contains("ALTER TABLE \"orders\" RENAME TO \"orders__old\";"));
    }

    #[test]
    fn test_plan_rendering_keeps_multiline_parameters_on_one_line() {
        let schema = TableSchema::new(
            "notes",
            vec![
                ColumnInfo::new("id", Some("INTEGER")).with_primary_key(1),
                ColumnInfo::new("body", Some("TEXT")),
            ],
        );
        let relation = Relation::from_rows(
            ["id", "body"],
            vec![vec![Value::Integer(1), Value::from("line one\nline two,it's")]],
        )
        .expect("relation");
        let plan = plan_first_normal_form(&schema, &relation, &DecomposeOptions::default())
            .expect("plan");

        let sql = format_plan(&plan);
        assert!(sql.contains("; -- [1, 'line one\\nline two']\n"), "{sql}");
        assert!(sql.contains("; -- [1, 'it''s']\n"), "{sql}");
        assert!(sql
            .lines()
            .all(|line| line.starts_with("-- ") || line.ends_with(';') || line.ends_with(']')));
    }

    #[test]
    fn test_noop_fix_event() {
        let event = SessionEvent::NothingToFix {
            table: "orders".to_string(),
            form: NormalForm::Third,
        };
        assert_eq!(
            format_event(&event, false),
            "No 3NF violations in orders; nothing to fix.\n"
        );
    }
}
