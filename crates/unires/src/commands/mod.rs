//! Command handlers: CLI args -> core pipeline -> output formatting.

pub mod import;
pub mod networks;
pub mod validate;

use tabled::Tabled;

use unires_core::{Outcome, RowReport};

/// Per-row table line shared by `import` and `validate`.
#[derive(Tabled)]
pub(crate) struct RowLine {
    #[tabled(rename = "Line")]
    line: u64,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Result")]
    outcome: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

impl From<&RowReport> for RowLine {
    fn from(r: &RowReport) -> Self {
        Self {
            line: r.line,
            vlan: r.vlan.map(|v| v.to_string()).unwrap_or_default(),
            mac: r.mac.clone(),
            name: r.name.clone().unwrap_or_default(),
            ip: r.ip.clone().unwrap_or_default(),
            outcome: outcome_label(r.outcome).into(),
            reason: r.reason.clone().unwrap_or_default(),
        }
    }
}

pub(crate) fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Created => "created",
        Outcome::Updated => "updated",
        Outcome::Unchanged => "unchanged",
        Outcome::WouldCreate => "would create",
        Outcome::WouldUpdate => "would update",
        Outcome::Skipped => "skipped",
        Outcome::Failed => "failed",
    }
}

pub(crate) fn plain_line(r: &RowReport) -> String {
    let mut line = format!("{}\t{}\t{}", r.line, r.mac, r.outcome);
    if let Some(ref reason) = r.reason {
        line.push('\t');
        line.push_str(reason);
    }
    line
}
