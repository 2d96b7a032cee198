//! CLI configuration: profile + secrets source + `GlobalOpts` overrides
//! folded into the `ControllerSettings` a session is opened with.

use std::io::IsTerminal;
use std::time::Duration;

use secrecy::SecretString;
use tracing::debug;

use unires_config::{Config, Credentials, ProfileSource, SecretSource, SecretsFile, config_path};
use unires_core::{ControllerSettings, PlatformHint, TlsVerification};

use crate::cli::{GlobalOpts, PlatformArg};
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

impl From<PlatformArg> for PlatformHint {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Auto => Self::Auto,
            PlatformArg::UnifiOs => Self::UnifiOs,
            PlatformArg::Classic => Self::Classic,
        }
    }
}

/// Build connection settings. Flags win over the secrets source, which
/// wins over profile defaults.
pub fn resolve_settings(global: &GlobalOpts) -> Result<ControllerSettings, CliError> {
    let config = unires_config::load_config()?;
    let profile_name = active_profile_name(global, &config);
    let profile = config.profile(&profile_name)?;

    let source: Box<dyn SecretSource + '_> = match global.secrets {
        Some(ref path) => Box::new(SecretsFile::new(path)),
        None => Box::new(ProfileSource::new(&profile_name, &profile)),
    };
    let source_name = source.describe();
    debug!(source = %source_name, "loading credentials");
    let creds = source.load()?;

    let missing = |what: &str, flag: &str| CliError::NoCredentials {
        what: what.into(),
        flag: flag.into(),
        source_name: source_name.clone(),
        path: config_path().display().to_string(),
    };

    // 1. Controller URL (flag > env > source)
    let url_str = global
        .controller
        .clone()
        .or(creds.controller.clone())
        .ok_or_else(|| missing("controller URL", "controller"))?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. Site and username
    let site = global
        .site
        .clone()
        .or(creds.site.clone())
        .unwrap_or_else(|| "default".into());
    let username = global
        .username
        .clone()
        .or(creds.username.clone())
        .ok_or_else(|| missing("username", "username"))?;

    // 3. Password
    let password = match resolve_password(creds, &username, &url)? {
        Some(pw) => pw,
        None => return Err(missing("password", "secrets")),
    };

    // 4. Platform
    let platform = match global.platform {
        Some(arg) => arg.into(),
        None => profile.platform_hint()?.unwrap_or_default(),
    };

    // 5. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(config.defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 6. Timeout
    let timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(config.defaults.timeout),
    );

    Ok(ControllerSettings {
        url,
        site,
        username,
        password,
        platform,
        tls,
        timeout,
    })
}

/// Source password, then `UNIRES_PASSWORD`, then an interactive prompt.
fn resolve_password(
    creds: Credentials,
    username: &str,
    url: &url::Url,
) -> Result<Option<SecretString>, CliError> {
    if let Some(pw) = creds.password {
        return Ok(Some(pw));
    }
    if let Ok(pw) = std::env::var("UNIRES_PASSWORD") {
        return Ok(Some(SecretString::from(pw)));
    }
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let pw = rpassword::prompt_password(format!("Password for {username} at {url}: "))?;
    Ok((!pw.is_empty()).then(|| SecretString::from(pw)))
}
