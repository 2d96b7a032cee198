// Legacy API network configuration endpoint

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyNetworkConf;

impl LegacyClient {
    /// List every configured network (LANs, VLAN-only, WAN, VPN).
    ///
    /// `GET /api/s/{site}/rest/networkconf`
    pub async fn list_network_conf(&self) -> Result<Vec<LegacyNetworkConf>, Error> {
        let url = self.site_url("rest/networkconf")?;
        debug!("listing network configuration");
        self.get(url).await
    }
}
