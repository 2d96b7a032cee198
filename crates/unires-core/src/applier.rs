// ── Reservation applier ──
//
// Walks parsed rows in file order, one or two controller calls per row.
// A row that fails never stops the batch; only the network fetch up front
// can abort an import.

use tracing::{error, info, warn};

use crate::error::{CoreError, FormatError, RowError};
use crate::model::{Reservation, VlanMap};
use crate::reader::ParsedRow;
use crate::report::{ImportReport, Outcome, RowReport};
use crate::resolver::list_networks;
use crate::session::Session;

pub const DEFAULT_NOTE: &str = "Imported by unires";

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Look everything up but issue no writes.
    pub dry_run: bool,
    /// Note attached to created records, and to updated ones that have none.
    pub note: Option<String>,
    /// Skip rows whose IP falls outside the network's subnet.
    pub strict_subnet: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            note: Some(DEFAULT_NOTE.to_owned()),
            strict_subnet: false,
        }
    }
}

pub struct Applier<'a> {
    session: &'a Session,
    networks: &'a VlanMap,
    options: ApplyOptions,
}

impl<'a> Applier<'a> {
    pub fn new(session: &'a Session, networks: &'a VlanMap, options: ApplyOptions) -> Self {
        Self {
            session,
            networks,
            options,
        }
    }

    pub async fn apply(&self, rows: &[ParsedRow]) -> ImportReport {
        let mut report = ImportReport::new(self.options.dry_run);

        for row in rows {
            let entry = match row {
                Ok(reservation) => {
                    let result = self.apply_one(reservation).await;
                    row_report(reservation, result)
                }
                Err(rejected) => {
                    warn!(line = rejected.line, mac = %rejected.raw_mac, reason = %rejected.error, "rejecting malformed row");
                    RowReport {
                        line: rejected.line,
                        mac: rejected.raw_mac.clone(),
                        name: None,
                        ip: None,
                        vlan: None,
                        outcome: Outcome::Failed,
                        reason: Some(rejected.error.to_string()),
                    }
                }
            };
            report.push(entry);
        }

        report
    }

    /// Reconcile one reservation with the controller.
    pub async fn apply_one(&self, reservation: &Reservation) -> Result<Outcome, RowError> {
        let network = self.networks.lookup(reservation.vlan)?;

        if network.contains(reservation.ip) == Some(false) {
            let subnet = network
                .subnet
                .map(|s| s.to_string())
                .unwrap_or_default();
            if self.options.strict_subnet {
                return Err(FormatError::OutsideSubnet {
                    ip: reservation.ip.to_string(),
                    subnet,
                }
                .into());
            }
            warn!(
                line = reservation.line,
                ip = %reservation.ip,
                network = %network.name,
                %subnet,
                "IP is outside the network subnet"
            );
        }

        let existing = self.session.find_client_by_mac(&reservation.mac).await?;

        match existing {
            Some(client) if client.matches(reservation, network) => Ok(Outcome::Unchanged),
            Some(_) if self.options.dry_run => Ok(Outcome::WouldUpdate),
            None if self.options.dry_run => Ok(Outcome::WouldCreate),
            Some(client) => {
                let keep_note = client.note.as_deref().is_some_and(|n| !n.is_empty());
                let note = if keep_note {
                    None
                } else {
                    self.options.note.as_deref()
                };
                self.session
                    .update_client(&client.id, &network.id, reservation.ip, &reservation.name, note)
                    .await?;
                Ok(Outcome::Updated)
            }
            None => {
                self.session
                    .create_client(
                        &reservation.mac,
                        &network.id,
                        reservation.ip,
                        &reservation.name,
                        self.options.note.as_deref(),
                    )
                    .await?;
                Ok(Outcome::Created)
            }
        }
    }
}

fn row_report(reservation: &Reservation, result: Result<Outcome, RowError>) -> RowReport {
    let (outcome, reason) = match result {
        Ok(outcome) => {
            info!(
                line = reservation.line,
                mac = %reservation.mac,
                ip = %reservation.ip,
                vlan = reservation.vlan,
                name = %reservation.name,
                %outcome,
                "row applied"
            );
            (outcome, None)
        }
        Err(e) if e.is_skip() => {
            warn!(line = reservation.line, mac = %reservation.mac, reason = %e, "skipping row");
            (Outcome::Skipped, Some(e.to_string()))
        }
        Err(e) => {
            error!(line = reservation.line, mac = %reservation.mac, error = %e, "row failed");
            if matches!(e, RowError::Remote(ref core) if core.is_session_fatal()) {
                error!("controller session is no longer valid; remaining rows will likely fail");
            }
            (Outcome::Failed, Some(e.to_string()))
        }
    };

    RowReport {
        line: reservation.line,
        mac: reservation.mac.to_string(),
        name: Some(reservation.name.clone()),
        ip: Some(reservation.ip.to_string()),
        vlan: Some(reservation.vlan),
        outcome,
        reason,
    }
}

/// Resolve networks once, then apply every row.
///
/// Fails only when the network list cannot be fetched; row-level problems
/// land in the report.
pub async fn import(
    session: &Session,
    rows: &[ParsedRow],
    options: ApplyOptions,
) -> Result<ImportReport, CoreError> {
    let networks = list_networks(session).await?;
    if networks.is_empty() {
        warn!("controller reports no VLAN-tagged networks; every row will be skipped");
    }
    info!(networks = networks.len(), rows = rows.len(), dry_run = options.dry_run, "starting import");

    let report = Applier::new(session, &networks, options).apply(rows).await;
    info!(summary = %report.summary(), "import finished");
    Ok(report)
}
