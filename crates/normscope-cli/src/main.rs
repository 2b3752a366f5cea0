//! normscope CLI - normal form analyzer for SQLite tables

use normscope_cli::cli;
use normscope_cli::decomposer;
use normscope_cli::logging;
use normscope_cli::output;
use normscope_cli::session::{Session, SessionCommand, SessionEvent, SessionOptions};
use normscope_cli::source::{SqliteSource, TableSource};

use anyhow::{Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use cli::{Args, OutputFormat};
use output::{format_event, format_json, format_report, TableReport};

/// Violations remain after the run.
const EXIT_FAILURE: u8 = 1;
/// Connection, identifier, key or migration error.
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    let result = if args.interactive {
        run_interactive(args)
    } else {
        run(args)
    };

    match result {
        Ok(has_violations) => {
            if has_violations {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("normscope: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let mut source = SqliteSource::open(&args.database)
        .with_context(|| format!("Failed to open database {}", args.database))?;

    let tables = if args.tables.is_empty() {
        let listed = source.list_tables().context("Failed to list tables")?;
        let (tables, unusable) = decomposer::partition_tables(listed);
        if !args.quiet {
            for table in &unusable {
                eprintln!("normscope: warning: skipping table '{table}': name is not a plain identifier");
            }
        }
        tables
    } else {
        args.tables.clone()
    };
    if tables.is_empty() && !args.quiet {
        eprintln!("normscope: warning: {} has no tables", source.location());
    }

    let options = args.decompose_options();
    let forms = args.fix_forms();
    let mut reports = Vec::with_capacity(tables.len());

    for table in &tables {
        let mut fixes = Vec::new();
        let mut plans = Vec::new();

        for &form in &forms {
            if args.dry_run {
                let plan = decomposer::plan_fix(&mut source, table, form, None, &options)
                    .with_context(|| format!("Failed to plan {form} fix for {table}"))?;
                plans.push(plan);
                continue;
            }

            let outcome = decomposer::fix(&mut source, table, form, None, &options)
                .with_context(|| format!("Failed to apply {form} fix to {table}"))?;
            if !args.quiet {
                if outcome.is_noop() {
                    eprintln!("normscope: {form} fix on {table}: nothing to do");
                } else {
                    eprintln!(
                        "normscope: {form} fix on {table}: created {}",
                        outcome.child_tables.join(", ")
                    );
                }
                for skipped in &outcome.skipped {
                    eprintln!("normscope: warning: {form} fix on {table}: skipped {skipped}");
                }
            }
            fixes.push(outcome);
        }

        let mut report = decomposer::inspect(&mut source, table, args.preview)
            .with_context(|| format!("Failed to analyze {table}"))?;
        report.fixes = fixes;
        report.plans = plans;
        reports.push(report);
    }

    let colored = args.output.is_none() && io::stdout().is_terminal();
    let output_str = match args.format {
        OutputFormat::Json => format_json(&reports, args.compact),
        OutputFormat::Table => format_report(&reports, colored),
    };
    write_output(&args.output, &output_str)?;

    Ok(reports.iter().any(TableReport::has_violations))
}

/// Line-oriented session on stdin; the exit status reflects the table
/// selected when the session ends.
fn run_interactive(args: Args) -> Result<bool> {
    let mut source = SqliteSource::open(&args.database)
        .with_context(|| format!("Failed to open database {}", args.database))?;
    let options = SessionOptions {
        decompose: args.decompose_options(),
        preview_rows: args.preview,
    };
    let mut session = Session::start(&mut source, options).context("Failed to start session")?;
    for table in session.unusable_tables() {
        eprintln!("normscope: warning: skipping table '{table}': name is not a plain identifier");
    }

    let colored = io::stdout().is_terminal();
    let prompt = io::stdin().is_terminal();
    let mut stdout = io::stdout();

    write!(
        stdout,
        "{}",
        format_event(&SessionEvent::Selected(session.report().clone()), colored)
    )?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if prompt {
            write!(stdout, "normscope [{}]> ", session.selected())?;
            stdout.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(message) => {
                eprintln!("normscope: warning: {message}");
                continue;
            }
        };

        match session.handle(&mut source, command) {
            Ok(SessionEvent::Quit) => break,
            Ok(event) => write!(stdout, "{}", format_event(&event, colored))?,
            Err(e) => eprintln!("normscope: error: {e:#}"),
        }
    }

    Ok(session.report().has_violations())
}

fn write_output(path: &Option<std::path::PathBuf>, content: &str) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, content)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    } else {
        io::stdout()
            .write_all(content.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure newline at end for terminal output
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
