// ── CSV reader ──
//
// Parses the `VLAN, MAC, Client Name, IP` file eagerly. Header problems
// and unreadable files are fatal; everything else is judged row by row so
// one bad line never hides the rest.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::net::Ipv4Addr;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{CoreError, FormatError};
use crate::model::{MacAddress, Reservation};

/// Column headers every import file must carry (any order, any case).
pub const REQUIRED_COLUMNS: [&str; 4] = ["VLAN", "MAC", "Client Name", "IP"];

/// A row that was reported and left out of the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub line: u64,
    /// MAC text exactly as written, for the report.
    pub raw_mac: String,
    pub error: FormatError,
}

pub type ParsedRow = Result<Reservation, RejectedRow>;

struct Columns {
    vlan: usize,
    mac: usize,
    name: usize,
    ip: usize,
}

impl Columns {
    fn locate(headers: &StringRecord, source: &str) -> Result<Self, CoreError> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim_start_matches('\u{feff}').trim().to_lowercase(), i))
            .collect();

        let find = |name: &str| index.get(&name.to_lowercase()).copied();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| find(c).is_none())
            .map(|c| (*c).to_owned())
            .collect();

        match (find("VLAN"), find("MAC"), find("Client Name"), find("IP")) {
            (Some(vlan), Some(mac), Some(name), Some(ip)) => Ok(Self {
                vlan,
                mac,
                name,
                ip,
            }),
            _ => Err(CoreError::MissingColumns {
                path: source.to_owned(),
                missing,
            }),
        }
    }
}

/// Read and validate every row of the CSV file at `path`.
pub fn read_rows(path: &Path) -> Result<Vec<ParsedRow>, CoreError> {
    let source = path.display().to_string();
    let file = File::open(path).map_err(|e| CoreError::CsvUnreadable {
        path: source.clone(),
        reason: e.to_string(),
    })?;
    read_rows_from(file, &source)
}

/// Read rows from any reader; `source` names it in error messages.
pub fn read_rows_from<R: io::Read>(reader: R, source: &str) -> Result<Vec<ParsedRow>, CoreError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| CoreError::CsvUnreadable {
            path: source.to_owned(),
            reason: e.to_string(),
        })?
        .clone();
    let columns = Columns::locate(&headers, source)?;

    let mut rows = Vec::new();
    let mut first_seen: HashMap<MacAddress, u64> = HashMap::new();

    for result in rdr.records() {
        let row = match result {
            Ok(record) => {
                let line = record.position().map_or(0, csv::Position::line);
                parse_record(&record, &columns, line)
            }
            Err(e) if e.is_io_error() => {
                return Err(CoreError::CsvUnreadable {
                    path: source.to_owned(),
                    reason: e.to_string(),
                });
            }
            Err(e) => Err(RejectedRow {
                line: e.position().map_or(0, csv::Position::line),
                raw_mac: String::new(),
                error: FormatError::Malformed {
                    message: e.to_string(),
                },
            }),
        };

        let row = row.and_then(|reservation| {
            match first_seen.get(&reservation.mac) {
                Some(&first_line) => Err(RejectedRow {
                    line: reservation.line,
                    raw_mac: reservation.mac.to_string(),
                    error: FormatError::DuplicateMac {
                        mac: reservation.mac.to_string(),
                        first_line,
                    },
                }),
                None => {
                    first_seen.insert(reservation.mac.clone(), reservation.line);
                    Ok(reservation)
                }
            }
        });

        rows.push(row);
    }

    debug!(source, rows = rows.len(), "parsed CSV");
    Ok(rows)
}

fn parse_record(record: &StringRecord, columns: &Columns, line: u64) -> ParsedRow {
    let field = |idx: usize| record.get(idx).unwrap_or_default().trim();
    let raw_mac = field(columns.mac);
    let reject = |error: FormatError| RejectedRow {
        line,
        raw_mac: raw_mac.to_owned(),
        error,
    };

    let vlan = parse_vlan(field(columns.vlan)).map_err(reject)?;
    let mac = MacAddress::parse(raw_mac).map_err(reject)?;
    let ip = parse_ipv4(field(columns.ip)).map_err(reject)?;
    let name = field(columns.name);
    if name.is_empty() {
        return Err(reject(FormatError::EmptyName));
    }

    Ok(Reservation {
        line,
        vlan,
        mac,
        name: name.to_owned(),
        ip,
    })
}

/// VLAN ids 1-4094; 0 and 4095 are reserved by 802.1Q.
pub fn parse_vlan(raw: &str) -> Result<u16, FormatError> {
    raw.parse::<u16>()
        .ok()
        .filter(|v| (1..=4094).contains(v))
        .ok_or_else(|| FormatError::InvalidVlan {
            raw: raw.to_owned(),
        })
}

pub fn parse_ipv4(raw: &str) -> Result<Ipv4Addr, FormatError> {
    raw.parse().map_err(|_| FormatError::InvalidIp {
        raw: raw.to_owned(),
    })
}
