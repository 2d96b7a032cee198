//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use unires_config::ConfigError;
use unires_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const ROW_FAILURES: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(unires::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             Self-signed certificate? Retry with --insecure (-k) or set ca_cert in the profile.\n\
             Wrong login flow? Try --platform unifi-os or --platform classic."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(unires::timeout),
        help("Increase the limit with --timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unires::auth_failed),
        help(
            "Verify the username and password for {source_name}.\n\
             Use a local controller account; cloud SSO accounts with MFA cannot log in here."
        )
    )]
    AuthFailed {
        message: String,
        source_name: String,
    },

    #[error("No {what} configured for {source_name}")]
    #[diagnostic(
        code(unires::no_credentials),
        help(
            "Pass --{flag}, set it in the profile at {path},\n\
             or point --secrets at a TOML file with host, username and password."
        )
    )]
    NoCredentials {
        what: String,
        flag: String,
        source_name: String,
        path: String,
    },

    // ── Controller ───────────────────────────────────────────────────
    #[error("Controller API error: {message}")]
    #[diagnostic(code(unires::api_error))]
    ApiError { message: String },

    // ── Input ────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(unires::csv),
        help("The file needs a header row with VLAN, MAC, Client Name and IP.")
    )]
    Csv { message: String },

    #[error("{count} row(s) failed validation")]
    #[diagnostic(code(unires::invalid_rows))]
    InvalidRows { count: usize },

    #[error("Import incomplete: {skipped} row(s) skipped, {failed} row(s) failed")]
    #[diagnostic(
        code(unires::row_failures),
        help("Fix the reported rows and run the same file again; finished rows are left unchanged.")
    )]
    RowFailures { skipped: usize, failed: usize },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unires::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(unires::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Csv { .. } | Self::InvalidRows { .. } | Self::Validation { .. } => {
                exit_code::USAGE
            }
            Self::RowFailures { .. } => exit_code::ROW_FAILURES,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                source_name: "the active profile".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            e @ (CoreError::Http { .. }
            | CoreError::Api { .. }
            | CoreError::MalformedResponse { .. }) => CliError::ApiError {
                message: e.to_string(),
            },

            e @ (CoreError::CsvUnreadable { .. } | CoreError::MissingColumns { .. }) => {
                CliError::Csv {
                    message: e.to_string(),
                }
            }

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}
