// ── Runtime connection settings ──
//
// These types describe how to reach a controller. They carry credential
// data and connection tuning but never touch disk; `unires-config` builds
// them and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use strum::{Display, EnumString};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

/// Which login flow and URL prefix to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PlatformHint {
    /// Probe the controller before logging in.
    #[default]
    Auto,
    /// UniFi OS console (UDM, UCG, Cloud Key Gen2+).
    UnifiOs,
    /// Standalone Network Application.
    Classic,
}

/// Everything needed to open a [`Session`](crate::Session).
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Controller URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    /// Site to operate on (usually "default").
    pub site: String,
    pub username: String,
    pub password: SecretString,
    pub platform: PlatformHint,
    pub tls: TlsVerification,
    /// Bound on every single HTTP request.
    pub timeout: Duration,
}
