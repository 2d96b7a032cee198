// unires-api: async client for the UniFi controller legacy API
//
// Only the surface a reservation import needs: session login/logout with
// CSRF handling, the network configuration list, and known-client (user)
// records keyed by MAC address.

pub mod auth;
pub mod error;
pub mod legacy;
pub mod transport;

pub use auth::ControllerPlatform;
pub use error::Error;
pub use legacy::LegacyClient;
pub use legacy::models::{LegacyNetworkConf, LegacyUser, UserConfig};
pub use reqwest::Method;
pub use transport::{TlsMode, TransportConfig};
