//! `import`: the reservation pipeline.

use serde::Serialize;
use tracing::info;

use unires_core::{
    ApplyOptions, ImportReport, ParsedRow, RowReport, Session, Summary, import, read_rows,
};

use crate::cli::{GlobalOpts, ImportArgs};
use crate::error::CliError;
use crate::output;

use super::{RowLine, plain_line};

#[derive(Serialize)]
struct ImportOutput<'a> {
    summary: Summary,
    rows: &'a [RowReport],
}

/// The CSV is read before login so a bad file never costs a session.
pub fn read_csv(args: &ImportArgs) -> Result<Vec<ParsedRow>, CliError> {
    Ok(read_rows(&args.csv)?)
}

pub async fn handle(
    session: &Session,
    rows: &[ParsedRow],
    args: &ImportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = import(session, rows, apply_options(args)).await?;
    render(&report, global)?;

    let summary = report.summary();
    if report.is_success() {
        info!("all rows applied");
        Ok(())
    } else {
        Err(CliError::RowFailures {
            skipped: summary.skipped,
            failed: summary.failed,
        })
    }
}

fn apply_options(args: &ImportArgs) -> ApplyOptions {
    let defaults = ApplyOptions::default();
    ApplyOptions {
        dry_run: args.dry_run,
        note: match args.note {
            Some(ref note) if note.is_empty() => None,
            Some(ref note) => Some(note.clone()),
            None => defaults.note,
        },
        strict_subnet: args.strict_subnet,
    }
}

fn render(report: &ImportReport, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let doc = ImportOutput {
        summary: report.summary(),
        rows: &report.rows,
    };

    let out = output::render_single(
        &global.output,
        &doc,
        |d| {
            let lines: Vec<RowLine> = d.rows.iter().map(RowLine::from).collect();
            format!(
                "{}\n{}",
                output::render_table(&lines),
                output::summary_line(&d.summary, color)
            )
        },
        |d| {
            let mut lines: Vec<String> = d.rows.iter().map(plain_line).collect();
            lines.push(output::summary_line(&d.summary, color));
            lines.join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
