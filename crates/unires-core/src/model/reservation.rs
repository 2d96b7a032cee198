use std::net::Ipv4Addr;

use serde::Serialize;

use super::mac::MacAddress;

/// One validated CSV row: bind `mac` to `ip` on the network tagged `vlan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    /// 1-based line in the source file, for reporting.
    pub line: u64,
    pub vlan: u16,
    pub mac: MacAddress,
    pub name: String,
    pub ip: Ipv4Addr,
}
