// Legacy API authentication
//
// Cookie-based session login/logout, CSRF bootstrap, and controller
// platform detection. The login endpoint sets a session cookie in the
// client's jar; subsequent requests use that cookie automatically.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::auth::ControllerPlatform;
use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::transport::TransportConfig;

impl LegacyClient {
    /// Authenticate with the controller using username/password.
    ///
    /// - UniFi OS: `POST /api/auth/login`
    /// - Standalone: `POST /api/login`
    ///
    /// On UniFi OS a CSRF token is required for writes; when the login
    /// response carries none, `GET /api/s/{site}/self` is used to obtain it.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.root_url(self.platform().login_path())?;

        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        if let Some(token) = resp
            .headers()
            .get("X-CSRF-Token")
            .and_then(|v| v.to_str().ok())
        {
            self.set_csrf_token(token.to_owned());
        }

        if self.platform().requires_csrf() && !self.has_csrf_token() {
            self.fetch_csrf_token().await?;
        }

        debug!("login successful");
        Ok(())
    }

    /// Ask the controller for a CSRF token via the `self` endpoint.
    async fn fetch_csrf_token(&self) -> Result<(), Error> {
        let url = self.site_url("self")?;
        debug!("requesting CSRF token");
        let _: Vec<serde_json::Value> = self.get(url).await?;
        if self.has_csrf_token() {
            Ok(())
        } else {
            Err(Error::Authentication {
                message: "controller returned no CSRF token; check the UniFi OS version".into(),
            })
        }
    }

    /// End the current session.
    ///
    /// - UniFi OS: `POST /api/auth/logout`
    /// - Standalone: `POST /api/logout`
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.root_url(self.platform().logout_path())?;

        debug!("logging out at {}", url);

        let builder = self.http().post(url);
        let builder = if self.platform().requires_csrf() {
            self.apply_csrf(builder)
        } else {
            builder
        };
        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http { status, body });
        }

        debug!("logout complete");
        Ok(())
    }

    /// Auto-detect the controller platform by probing login endpoints.
    ///
    /// UniFi OS answers `/api/auth/login` (even with 401/405); standalone
    /// controllers return 404 there.
    pub async fn detect_platform(
        base_url: &Url,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, Error> {
        let http = transport.build_client()?;

        let unifi_os_url = base_url.join("/api/auth/login")?;
        debug!("probing UniFi OS at {}", unifi_os_url);

        if let Ok(resp) = http.get(unifi_os_url).send().await {
            if resp.status() != reqwest::StatusCode::NOT_FOUND {
                debug!("detected UniFi OS platform");
                return Ok(ControllerPlatform::UnifiOs);
            }
        }

        let standalone_url = base_url.join("/api/login")?;
        debug!("probing standalone at {}", standalone_url);

        match http.get(standalone_url).send().await {
            Ok(_) => {
                debug!("detected standalone (classic) controller");
                Ok(ControllerPlatform::ClassicController)
            }
            Err(e) if e.is_timeout() => Err(Error::Timeout {
                timeout_secs: transport.timeout.as_secs(),
            }),
            Err(e) => Err(Error::Transport(e)),
        }
    }
}
