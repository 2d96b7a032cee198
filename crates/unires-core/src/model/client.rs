use std::net::Ipv4Addr;

use serde::Serialize;
use unires_api::LegacyUser;

use super::network::NetworkRef;
use super::reservation::Reservation;

/// Controller-side known-client record, reduced to the fields an import
/// reconciles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    pub id: String,
    pub mac: String,
    pub name: Option<String>,
    pub network_id: Option<String>,
    pub fixed_ip: Option<Ipv4Addr>,
    pub use_fixedip: bool,
    pub note: Option<String>,
}

impl ClientRecord {
    /// Whether this record already carries `reservation` on `network`.
    pub fn matches(&self, reservation: &Reservation, network: &NetworkRef) -> bool {
        self.use_fixedip
            && self.fixed_ip == Some(reservation.ip)
            && self.network_id.as_deref() == Some(network.id.as_str())
            && self.name.as_deref() == Some(reservation.name.as_str())
    }
}

impl From<LegacyUser> for ClientRecord {
    fn from(user: LegacyUser) -> Self {
        Self {
            id: user.id,
            mac: user.mac,
            name: user.name,
            network_id: user.network_id,
            fixed_ip: user.fixed_ip.as_deref().and_then(|ip| ip.trim().parse().ok()),
            use_fixedip: user.use_fixedip,
            note: user.note,
        }
    }
}
