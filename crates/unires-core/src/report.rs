// ── Import report ──

use std::fmt;

use serde::Serialize;

/// What happened to a single CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Created,
    Updated,
    /// The controller already held this exact reservation.
    Unchanged,
    WouldCreate,
    WouldUpdate,
    /// Parsed, but not applicable here: unknown VLAN or subnet mismatch.
    Skipped,
    /// Malformed in the CSV, or the controller call for this row failed.
    Failed,
}

impl Outcome {
    pub fn is_problem(self) -> bool {
        matches!(self, Self::Skipped | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowReport {
    pub line: u64,
    /// Normalized MAC when the row parsed, raw text otherwise.
    pub mac: String,
    pub name: Option<String>,
    pub ip: Option<String>,
    pub vlan: Option<u16>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub dry_run: bool,
    pub rows: Vec<RowReport>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub dry_run: bool,
}

impl ImportReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: RowReport) {
        self.rows.push(row);
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.rows.len(),
            dry_run: self.dry_run,
            ..Summary::default()
        };
        for row in &self.rows {
            match row.outcome {
                Outcome::Created | Outcome::WouldCreate => summary.created += 1,
                Outcome::Updated | Outcome::WouldUpdate => summary.updated += 1,
                Outcome::Unchanged => summary.unchanged += 1,
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// `true` when no row was skipped or failed.
    pub fn is_success(&self) -> bool {
        !self.rows.iter().any(|r| r.outcome.is_problem())
    }

    pub fn problems(&self) -> impl Iterator<Item = &RowReport> {
        self.rows.iter().filter(|r| r.outcome.is_problem())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (created, updated) = if self.dry_run {
            ("would create", "would update")
        } else {
            ("created", "updated")
        };
        write!(
            f,
            "{} rows: {} {created}, {} {updated}, {} unchanged, {} skipped, {} failed",
            self.total, self.created, self.updated, self.unchanged, self.skipped, self.failed
        )
    }
}
