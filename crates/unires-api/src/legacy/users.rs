// Legacy API known-client (user) endpoints
//
// `stat/user/{mac}` looks a client up by MAC; `rest/user` creates and
// updates the persisted record that carries the fixed-IP reservation.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::{LegacyUser, UserConfig};

impl LegacyClient {
    /// Look up the known-client record for a MAC address.
    ///
    /// `GET /api/s/{site}/stat/user/{mac}`. The controller answers
    /// `api.err.UnknownUser` for MACs it has never seen; that maps to `None`.
    pub async fn get_user_by_mac(&self, mac: &str) -> Result<Option<LegacyUser>, Error> {
        let url = self.site_url(&format!("stat/user/{mac}"))?;
        debug!(mac, "looking up client record");
        match self.get::<LegacyUser>(url).await {
            Ok(users) => Ok(users.into_iter().next()),
            Err(e) if e.is_unknown_user() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a known-client record.
    ///
    /// `POST /api/s/{site}/rest/user`
    pub async fn create_user(&self, config: &UserConfig) -> Result<LegacyUser, Error> {
        let url = self.site_url("rest/user")?;
        debug!(mac = ?config.mac, "creating client record");
        let created: Vec<LegacyUser> = self.post(url, config).await?;
        first_record(created, "create")
    }

    /// Update an existing known-client record by its `_id`.
    ///
    /// `PUT /api/s/{site}/rest/user/{id}`
    pub async fn update_user(&self, id: &str, config: &UserConfig) -> Result<LegacyUser, Error> {
        let url = self.site_url(&format!("rest/user/{id}"))?;
        debug!(id, "updating client record");
        let updated: Vec<LegacyUser> = self.put(url, config).await?;
        first_record(updated, "update")
    }
}

fn first_record(records: Vec<LegacyUser>, op: &str) -> Result<LegacyUser, Error> {
    records.into_iter().next().ok_or_else(|| Error::LegacyApi {
        message: format!("{op} returned no client record"),
    })
}
