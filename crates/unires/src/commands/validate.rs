//! `validate`: offline CSV check.

use serde::Serialize;

use unires_core::{ImportReport, Outcome, RowReport, read_rows};

use crate::cli::{GlobalOpts, ValidateArgs};
use crate::error::CliError;
use crate::output;

use super::{RowLine, plain_line};

#[derive(Serialize)]
struct ValidateOutput<'a> {
    valid: usize,
    rejected: usize,
    rows: &'a [RowReport],
}

pub fn handle(args: &ValidateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let rows = read_rows(&args.csv)?;

    // Reuse the import report shape; a valid row is one the import would try.
    let mut report = ImportReport::new(true);
    for row in &rows {
        report.push(match row {
            Ok(r) => RowReport {
                line: r.line,
                mac: r.mac.to_string(),
                name: Some(r.name.clone()),
                ip: Some(r.ip.to_string()),
                vlan: Some(r.vlan),
                outcome: Outcome::WouldCreate,
                reason: None,
            },
            Err(rejected) => RowReport {
                line: rejected.line,
                mac: rejected.raw_mac.clone(),
                name: None,
                ip: None,
                vlan: None,
                outcome: Outcome::Failed,
                reason: Some(rejected.error.to_string()),
            },
        });
    }

    let rejected = report.problems().count();
    let doc = ValidateOutput {
        valid: report.rows.len() - rejected,
        rejected,
        rows: &report.rows,
    };

    let out = output::render_single(
        &global.output,
        &doc,
        |d| {
            let lines: Vec<RowLine> = d
                .rows
                .iter()
                .map(|r| {
                    let mut line = RowLine::from(r);
                    if r.outcome == Outcome::WouldCreate {
                        line.outcome = "ok".into();
                    }
                    line
                })
                .collect();
            format!(
                "{}\n{} valid, {} rejected",
                output::render_table(&lines),
                d.valid,
                d.rejected
            )
        },
        |d| {
            d.rows
                .iter()
                .filter(|r| r.outcome.is_problem())
                .map(plain_line)
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);

    if rejected > 0 {
        return Err(CliError::InvalidRows { count: rejected });
    }
    Ok(())
}
