//! Configuration for unires.
//!
//! TOML profiles loaded through figment, credential resolution (env,
//! keyring, plaintext) and the [`SecretSource`] seam that lets a run
//! take its controller credentials from either a profile or a
//! standalone secrets file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use unires_core::PlatformHint;

/// Keyring service name; entries are keyed `{profile}/password`.
pub const KEYRING_SERVICE: &str = "unires";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found in {}", .path.display())]
    UnknownProfile { profile: String, path: PathBuf },

    #[error("no {what} configured for '{source_name}'")]
    Missing { what: String, source_name: String },

    #[error("cannot read secrets file {}: {reason}", .path.display())]
    SecretsFile { path: PathBuf, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level `config.toml`.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

/// Fallbacks for profiles that leave a field unset.
#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named controller profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://192.168.1.1").
    pub controller: Option<String>,

    #[serde(default = "default_site")]
    pub site: String,

    pub username: Option<String>,

    /// Plaintext password (prefer keyring or `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// "auto", "unifi-os" or "classic".
    pub platform: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    /// Per-request timeout in seconds.
    pub timeout: Option<u64>,
}

fn default_site() -> String {
    "default".into()
}

impl Profile {
    pub fn platform_hint(&self) -> Result<Option<PlatformHint>, ConfigError> {
        self.platform
            .as_deref()
            .map(|raw| {
                raw.parse().map_err(|_| ConfigError::Validation {
                    field: "platform".into(),
                    reason: format!("expected 'auto', 'unifi-os' or 'classic', got '{raw}'"),
                })
            })
            .transpose()
    }
}

impl Config {
    /// Look up a profile; only the implicit `default` profile may be absent.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile {
                site: default_site(),
                ..Profile::default()
            }),
            None => Err(ConfigError::UnknownProfile {
                profile: name.into(),
                path: config_path(),
            }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// `UNIRES_CONFIG` if set, else the platform config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("UNIRES_CONFIG") {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "unires", "unires").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("unires");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load config from the canonical path plus `UNIRES_` environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// A missing file yields the defaults. Nested keys come from the
/// environment with a double underscore (`UNIRES_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("UNIRES_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Secret sources ──────────────────────────────────────────────────

/// Controller credentials from one source. Fields the source does not
/// know stay `None` and are filled from flags or prompts.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub controller: Option<String>,
    pub site: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

/// Where a run gets its controller credentials.
pub trait SecretSource {
    /// Short label for log and error messages.
    fn describe(&self) -> String;

    fn load(&self) -> Result<Credentials, ConfigError>;
}

/// Credentials from a named `config.toml` profile.
pub struct ProfileSource<'a> {
    name: &'a str,
    profile: &'a Profile,
}

impl<'a> ProfileSource<'a> {
    pub fn new(name: &'a str, profile: &'a Profile) -> Self {
        Self { name, profile }
    }
}

impl SecretSource for ProfileSource<'_> {
    fn describe(&self) -> String {
        format!("profile '{}'", self.name)
    }

    fn load(&self) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            controller: self.profile.controller.clone(),
            site: Some(self.profile.site.clone()),
            username: self.profile.username.clone(),
            password: resolve_password(self.profile, self.name),
        })
    }
}

/// Flat TOML secrets file:
///
/// ```toml
/// host = "https://192.168.1.1"
/// username = "importer"
/// password = "..."
/// site = "default"
/// ```
pub struct SecretsFile {
    path: PathBuf,
}

#[derive(Deserialize)]
struct SecretsFileContents {
    #[serde(alias = "host")]
    controller: Option<String>,
    site: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl SecretsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretSource for SecretsFile {
    fn describe(&self) -> String {
        format!("secrets file {}", self.path.display())
    }

    fn load(&self) -> Result<Credentials, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| ConfigError::SecretsFile {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let contents: SecretsFileContents =
            toml::from_str(&text).map_err(|e| ConfigError::SecretsFile {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        debug!(path = %self.path.display(), "loaded secrets file");

        Ok(Credentials {
            controller: contents.controller.map(with_scheme),
            site: contents.site,
            username: contents.username,
            password: contents.password.map(SecretString::from),
        })
    }
}

/// A bare `host` (`192.168.1.1`, `unifi.lan:8443`) means HTTPS.
fn with_scheme(host: String) -> String {
    if host.contains("://") {
        host
    } else {
        format!("https://{host}")
    }
}

// ── Password resolution ─────────────────────────────────────────────

/// Resolve a profile's password: `UNIRES_PASSWORD`, the profile's
/// `password_env`, the system keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_password_with(profile, profile_name, |name| std::env::var(name).ok())
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    if let Some(pw) = env("UNIRES_PASSWORD") {
        debug!("password from UNIRES_PASSWORD");
        return Some(SecretString::from(pw));
    }

    if let Some(ref var) = profile.password_env {
        if let Some(pw) = env(var) {
            debug!(var = %var, "password from profile password_env");
            return Some(SecretString::from(pw));
        }
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            debug!(profile = profile_name, "password from keyring");
            return Some(SecretString::from(pw));
        }
    }

    profile.password.clone().map(SecretString::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.timeout, 30);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn profiles_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "config.toml",
            r#"
default_profile = "home"

[defaults]
timeout = 10

[profiles.home]
controller = "https://10.0.0.1"
username = "admin"
password_env = "HOME_UNIFI_PW"
platform = "unifi-os"
insecure = true
"#,
        );

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("home"));
        assert_eq!(config.defaults.timeout, 10);

        let home = config.profile("home").unwrap();
        assert_eq!(home.controller.as_deref(), Some("https://10.0.0.1"));
        assert_eq!(home.site, "default");
        assert_eq!(home.platform_hint().unwrap(), Some(PlatformHint::UnifiOs));
        assert_eq!(home.insecure, Some(true));
    }

    #[test]
    fn unknown_profile_is_an_error_except_default() {
        let config = Config::default();
        assert!(config.profile("default").is_ok());
        assert!(matches!(
            config.profile("lab"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn bad_platform_is_rejected() {
        let profile = Profile {
            platform: Some("cloud".into()),
            ..Profile::default()
        };
        assert!(matches!(
            profile.platform_hint(),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn password_env_beats_plaintext() {
        let profile = Profile {
            password: Some("plain".into()),
            password_env: Some("LAB_PW".into()),
            ..Profile::default()
        };
        let env = |name: &str| (name == "LAB_PW").then(|| "from-env".to_string());
        let pw = resolve_password_with(&profile, "unires-test-none", env).unwrap();
        assert_eq!(pw.expose_secret(), "from-env");
    }

    #[test]
    fn unires_password_wins_over_everything() {
        let profile = Profile {
            password: Some("plain".into()),
            password_env: Some("LAB_PW".into()),
            ..Profile::default()
        };
        let env = |name: &str| match name {
            "UNIRES_PASSWORD" => Some("global".to_string()),
            "LAB_PW" => Some("from-env".to_string()),
            _ => None,
        };
        let pw = resolve_password_with(&profile, "unires-test-none", env).unwrap();
        assert_eq!(pw.expose_secret(), "global");
    }

    #[test]
    fn plaintext_is_the_last_resort() {
        let profile = Profile {
            password: Some("plain".into()),
            ..Profile::default()
        };
        let pw = resolve_password_with(&profile, "unires-test-none", |_| None).unwrap();
        assert_eq!(pw.expose_secret(), "plain");

        let empty = Profile::default();
        assert!(resolve_password_with(&empty, "unires-test-none", |_| None).is_none());
    }

    #[test]
    fn secrets_file_accepts_host_alias() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "secrets.toml",
            "host = \"https://192.168.1.1\"\nusername = \"importer\"\npassword = \"s3cret\"\n",
        );

        let source = SecretsFile::new(&path);
        let creds = source.load().unwrap();
        assert_eq!(creds.controller.as_deref(), Some("https://192.168.1.1"));
        assert_eq!(creds.username.as_deref(), Some("importer"));
        assert_eq!(creds.password.unwrap().expose_secret(), "s3cret");
        assert!(creds.site.is_none());
        assert!(source.describe().starts_with("secrets file"));
    }

    #[test]
    fn secrets_file_bare_host_gets_https() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "secrets.toml",
            "host = \"192.168.1.1\"\nusername = \"importer\"\npassword = \"pw\"\n",
        );

        let creds = SecretsFile::new(&path).load().unwrap();
        let controller = creds.controller.unwrap();
        assert_eq!(controller, "https://192.168.1.1");
        assert!(controller.parse::<url::Url>().is_ok());

        assert_eq!(with_scheme("http://10.0.0.1:8080".into()), "http://10.0.0.1:8080");
        assert_eq!(with_scheme("unifi.lan:8443".into()), "https://unifi.lan:8443");
    }

    #[test]
    fn unreadable_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SecretsFile::new(dir.path().join("missing.toml"));
        assert!(matches!(missing.load(), Err(ConfigError::SecretsFile { .. })));

        let garbage = SecretsFile::new(write(&dir, "bad.toml", "host = [unterminated"));
        assert!(matches!(garbage.load(), Err(ConfigError::SecretsFile { .. })));
    }

    #[test]
    fn profile_source_carries_profile_fields() {
        let profile = Profile {
            controller: Some("https://unifi.lan".into()),
            site: "branch".into(),
            username: Some("ops".into()),
            ..Profile::default()
        };
        let creds = ProfileSource::new("lab", &profile).load().unwrap();
        assert_eq!(creds.controller.as_deref(), Some("https://unifi.lan"));
        assert_eq!(creds.site.as_deref(), Some("branch"));
        assert_eq!(creds.username.as_deref(), Some("ops"));
    }
}
