// ── Controller session ──
//
// One authenticated connection per run. `open` logs in, `close` consumes
// the session and logs out; everything in between borrows it.

use std::net::Ipv4Addr;

use tracing::{debug, info, warn};
use unires_api::{ControllerPlatform, LegacyClient, Method, TlsMode, TransportConfig, UserConfig};

use crate::config::{ControllerSettings, PlatformHint, TlsVerification};
use crate::error::CoreError;
use crate::model::{ClientRecord, MacAddress};

/// Authenticated handle on a controller site.
pub struct Session {
    client: LegacyClient,
}

impl Session {
    /// Log in to the controller described by `settings`.
    ///
    /// Any failure here is fatal for the run: bad credentials, unreachable
    /// host, TLS trouble, or a missing CSRF token.
    pub async fn open(settings: &ControllerSettings) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: match &settings.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: settings.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar();

        let platform = match settings.platform {
            PlatformHint::UnifiOs => ControllerPlatform::UnifiOs,
            PlatformHint::Classic => ControllerPlatform::ClassicController,
            PlatformHint::Auto => LegacyClient::detect_platform(&settings.url, &transport)
                .await
                .map_err(|e| connection_error(&settings.url, e))?,
        };
        debug!(%platform, "using controller platform");

        let client = LegacyClient::new(
            settings.url.clone(),
            settings.site.clone(),
            platform,
            &transport,
        )?;

        info!(controller = %settings.url, site = %settings.site, "connecting to controller");
        client
            .login(&settings.username, &settings.password)
            .await
            .map_err(|e| connection_error(&settings.url, e))?;

        debug!(username = %settings.username, "authenticated");
        Ok(Self { client })
    }

    /// Wrap an already-authenticated client.
    pub fn from_client(client: LegacyClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &LegacyClient {
        &self.client
    }

    /// Issue a raw site-scoped call, returning the envelope's `data` array.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Vec<serde_json::Value>, CoreError> {
        Ok(self.client.request(method, path, body).await?)
    }

    /// Look up the known-client record for `mac`.
    pub async fn find_client_by_mac(
        &self,
        mac: &MacAddress,
    ) -> Result<Option<ClientRecord>, CoreError> {
        let user = self.client.get_user_by_mac(mac.as_str()).await?;
        Ok(user.map(ClientRecord::from))
    }

    /// Create a client record with a fixed IP on `network_id`.
    pub async fn create_client(
        &self,
        mac: &MacAddress,
        network_id: &str,
        ip: Ipv4Addr,
        name: &str,
        note: Option<&str>,
    ) -> Result<ClientRecord, CoreError> {
        let body = UserConfig {
            mac: Some(mac.to_string()),
            name: name.to_owned(),
            network_id: network_id.to_owned(),
            fixed_ip: ip.to_string(),
            use_fixedip: true,
            note: note.map(String::from),
        };
        let user = self.client.create_user(&body).await?;
        Ok(ClientRecord::from(user))
    }

    /// Point an existing client record at `network_id` / `ip`.
    ///
    /// `note` is only sent when given, so an existing note survives.
    pub async fn update_client(
        &self,
        client_id: &str,
        network_id: &str,
        ip: Ipv4Addr,
        name: &str,
        note: Option<&str>,
    ) -> Result<ClientRecord, CoreError> {
        let body = UserConfig {
            mac: None,
            name: name.to_owned(),
            network_id: network_id.to_owned(),
            fixed_ip: ip.to_string(),
            use_fixedip: true,
            note: note.map(String::from),
        };
        let user = self.client.update_user(client_id, &body).await?;
        Ok(ClientRecord::from(user))
    }

    /// Log out and release the session. Failures are logged, not returned.
    pub async fn close(self) {
        match self.client.logout().await {
            Ok(()) => info!(site = self.client.site(), "logged out of controller"),
            Err(e) => warn!(error = %e, "logout failed"),
        }
    }
}

/// Login-time failures: keep auth errors, turn everything else into a
/// connection failure naming the controller.
fn connection_error(url: &url::Url, err: unires_api::Error) -> CoreError {
    match CoreError::from(err) {
        e @ (CoreError::AuthenticationFailed { .. } | CoreError::Timeout { .. }) => e,
        CoreError::ConnectionFailed { reason, .. } => CoreError::ConnectionFailed {
            url: url.to_string(),
            reason,
        },
        other => CoreError::ConnectionFailed {
            url: url.to_string(),
            reason: other.to_string(),
        },
    }
}
