// Legacy API response and request types
//
// Fields use `#[serde(default)]` liberally because the API is inconsistent
// about field presence across firmware versions.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard UniFi legacy API response envelope.
///
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Network configuration ────────────────────────────────────────────

/// Network object from `rest/networkconf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyNetworkConf {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// "corporate", "guest", "wan", "vlan-only", "remote-user-vpn", ...
    #[serde(default)]
    pub purpose: Option<String>,
    /// Some firmware sends the tag as a string, some as a number.
    #[serde(default, deserialize_with = "de_vlan")]
    pub vlan: Option<u16>,
    #[serde(default)]
    pub vlan_enabled: Option<bool>,
    /// Gateway address in CIDR form, e.g. `192.168.10.1/24`.
    #[serde(default)]
    pub ip_subnet: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Unusable tags (negative, too large, non-numeric) become `None` so one
/// odd network never fails the whole list.
fn de_vlan<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let vlan = match raw {
        Some(serde_json::Value::Number(ref n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Some(serde_json::Value::String(ref s)) if s.trim().is_empty() => return Ok(None),
        Some(serde_json::Value::String(ref s)) => s.trim().parse().ok(),
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(_) => None,
    };
    if vlan.is_none() {
        debug!(raw = ?raw, "ignoring unusable vlan tag");
    }
    Ok(vlan)
}

// ── Known client (user) ──────────────────────────────────────────────

/// Known-client record from `stat/user/{mac}` and `rest/user`.
///
/// Unlike `stat/sta`, these exist for offline clients too and carry the
/// fixed-IP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub fixed_ip: Option<String>,
    #[serde(default)]
    pub use_fixedip: bool,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `POST rest/user` and `PUT rest/user/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserConfig {
    /// Required on create, omitted on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    pub name: String,
    pub network_id: String,
    pub fixed_ip: String,
    pub use_fixedip: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
