// ── VLAN resolver ──
//
// Turns `rest/networkconf` into a VLAN id -> network id mapping. The
// default LAN usually has no `vlan` field at all; it is untagged VLAN 1.

use tracing::{debug, warn};
use unires_api::LegacyNetworkConf;

use crate::error::CoreError;
use crate::model::{NetworkRef, VlanMap};
use crate::session::Session;

const DEFAULT_LAN_VLAN: u16 = 1;

/// Fetch the controller's networks and build the VLAN mapping.
pub async fn list_networks(session: &Session) -> Result<VlanMap, CoreError> {
    let networks = session.client().list_network_conf().await?;
    debug!(count = networks.len(), "fetched network configuration");
    let map = build_vlan_map(&networks);
    debug!(vlans = ?map.vlans().collect::<Vec<_>>(), "available VLANs");
    Ok(map)
}

/// Build the mapping from raw network objects.
///
/// - `purpose == "corporate"` with no VLAN (or VLAN 1) is the default LAN -> VLAN 1
/// - any other network with a VLAN maps that VLAN
/// - networks without a VLAN (WAN, VPN) are ignored
pub fn build_vlan_map(networks: &[LegacyNetworkConf]) -> VlanMap {
    let mut map = VlanMap::default();

    for net in networks {
        let is_corporate = net.purpose.as_deref() == Some("corporate");
        let vlan = match net.vlan {
            None | Some(DEFAULT_LAN_VLAN) if is_corporate => DEFAULT_LAN_VLAN,
            Some(vlan) => vlan,
            None => continue,
        };

        let name = net.name.clone().unwrap_or_else(|| net.id.clone());
        let subnet = net.ip_subnet.as_deref().and_then(|raw| match raw.parse() {
            Ok(subnet) => Some(subnet),
            Err(e) => {
                debug!(network = %name, subnet = raw, error = %e, "ignoring unparseable subnet");
                None
            }
        });

        let candidate = NetworkRef {
            id: net.id.clone(),
            name,
            vlan,
            subnet,
        };
        debug!(vlan, id = %candidate.id, name = %candidate.name, "mapped VLAN");

        if let Some(existing) = map.insert(candidate) {
            warn!(
                vlan,
                kept = %existing.name,
                ignored = %net.name.as_deref().unwrap_or(&net.id),
                "duplicate VLAN id across networks"
            );
        }
    }

    map
}
