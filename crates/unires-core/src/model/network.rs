use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use crate::error::ResolutionError;

/// A controller network that carries a VLAN tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRef {
    /// Controller object id (`_id` in `rest/networkconf`).
    pub id: String,
    pub name: String,
    pub vlan: u16,
    /// Gateway address and prefix, when the network is routed locally.
    pub subnet: Option<Ipv4Network>,
}

impl NetworkRef {
    /// `None` when the network has no known subnet.
    pub fn contains(&self, ip: Ipv4Addr) -> Option<bool> {
        self.subnet.map(|net| net.contains(ip))
    }
}

/// VLAN id -> network mapping, fetched fresh on every run.
#[derive(Debug, Clone, Default)]
pub struct VlanMap {
    by_vlan: BTreeMap<u16, NetworkRef>,
}

impl VlanMap {
    /// Insert a network; the first network seen for a VLAN wins.
    ///
    /// Returns the network already holding the VLAN when `network` is
    /// rejected as a duplicate.
    pub fn insert(&mut self, network: NetworkRef) -> Option<&NetworkRef> {
        use std::collections::btree_map::Entry;

        match self.by_vlan.entry(network.vlan) {
            Entry::Vacant(slot) => {
                slot.insert(network);
                None
            }
            Entry::Occupied(existing) => Some(existing.into_mut()),
        }
    }

    pub fn lookup(&self, vlan: u16) -> Result<&NetworkRef, ResolutionError> {
        self.by_vlan
            .get(&vlan)
            .ok_or_else(|| ResolutionError::UnknownVlan {
                vlan,
                available: self.describe_vlans(),
            })
    }

    /// Known VLAN ids in ascending order.
    pub fn vlans(&self) -> impl Iterator<Item = u16> + '_ {
        self.by_vlan.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkRef> {
        self.by_vlan.values()
    }

    pub fn len(&self) -> usize {
        self.by_vlan.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_vlan.is_empty()
    }

    fn describe_vlans(&self) -> String {
        if self.by_vlan.is_empty() {
            return "none".into();
        }
        self.vlans()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn net(id: &str, vlan: u16, subnet: Option<&str>) -> NetworkRef {
        NetworkRef {
            id: id.into(),
            name: id.to_uppercase(),
            vlan,
            subnet: subnet.map(|s| s.parse().unwrap()),
        }
    }

    #[test]
    fn lookup_known_and_unknown() {
        let mut map = VlanMap::default();
        assert!(map.insert(net("net_a", 1, None)).is_none());
        assert!(map.insert(net("net_b", 20, None)).is_none());

        assert_eq!(map.lookup(20).unwrap().id, "net_b");
        assert_eq!(
            map.lookup(30),
            Err(ResolutionError::UnknownVlan {
                vlan: 30,
                available: "1, 20".into()
            })
        );
    }

    #[test]
    fn first_network_wins() {
        let mut map = VlanMap::default();
        map.insert(net("first", 10, None));
        let existing = map.insert(net("second", 10, None)).unwrap();
        assert_eq!(existing.id, "first");
        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup(10).unwrap().id, "first");
    }

    #[test]
    fn empty_map_reports_none_available() {
        let map = VlanMap::default();
        assert!(map.is_empty());
        assert!(matches!(
            map.lookup(1),
            Err(ResolutionError::UnknownVlan { ref available, .. }) if available == "none"
        ));
    }

    #[test]
    fn subnet_containment() {
        let n = net("net_a", 1, Some("192.168.1.1/24"));
        assert_eq!(n.contains(Ipv4Addr::new(192, 168, 1, 50)), Some(true));
        assert_eq!(n.contains(Ipv4Addr::new(192, 168, 2, 50)), Some(false));
        assert_eq!(net("x", 2, None).contains(Ipv4Addr::LOCALHOST), None);
    }
}
