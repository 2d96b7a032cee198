// ── Core error types ──
//
// `CoreError` covers whole-run and per-call failures. `FormatError` and
// `ResolutionError` are per-row and never abort a batch. `RowError` joins
// the three for the applier.

use thiserror::Error;

/// Unified error type for session, network and CSV-level failures.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API errors ───────────────────────────────────────────────────
    /// Non-2xx response; the body is opaque diagnostic text.
    #[error("Controller returned HTTP {status}: {}", .body.chars().take(200).collect::<String>())]
    Http { status: u16, body: String },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Malformed controller response: {message}")]
    MalformedResponse { message: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Cannot read CSV file {path}: {reason}")]
    CsvUnreadable { path: String, reason: String },

    #[error("CSV file {path} is missing required column(s): {}", .missing.join(", "))]
    MissingColumns { path: String, missing: Vec<String> },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` for errors that mean the controller session is unusable.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::ConnectionFailed { .. }
        )
    }
}

/// A CSV row whose fields cannot be turned into a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid MAC address '{raw}' (need exactly 12 hex digits)")]
    InvalidMac { raw: String },

    #[error("invalid IPv4 address '{raw}'")]
    InvalidIp { raw: String },

    #[error("invalid VLAN id '{raw}' (expected 1-4094)")]
    InvalidVlan { raw: String },

    #[error("client name is empty")]
    EmptyName,

    #[error("malformed CSV record: {message}")]
    Malformed { message: String },

    #[error("MAC {mac} already listed on line {first_line}")]
    DuplicateMac { mac: String, first_line: u64 },

    #[error("IP {ip} is outside network subnet {subnet}")]
    OutsideSubnet { ip: String, subnet: String },
}

/// A row that parsed cleanly but cannot be mapped onto a controller network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("unknown VLAN {vlan} (available: {available})")]
    UnknownVlan { vlan: u16, available: String },
}

/// Per-row failure inside the applier.
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Remote(#[from] CoreError),
}

impl RowError {
    /// Local precondition failures skip the row; remote failures fail it.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Format(_) | Self::Resolution(_))
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unires_api::Error> for CoreError {
    fn from(err: unires_api::Error) -> Self {
        match err {
            unires_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unires_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                    }
                }
            }
            unires_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unires_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            unires_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            unires_api::Error::Http { status, body } => CoreError::Http { status, body },
            unires_api::Error::LegacyApi { message } => CoreError::Api { message },
            unires_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_core() {
        let err: CoreError = unires_api::Error::Http {
            status: 502,
            body: "bad gateway".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Http { status: 502, .. }));

        let err: CoreError = unires_api::Error::Authentication {
            message: "nope".into(),
        }
        .into();
        assert!(err.is_session_fatal());

        let err: CoreError = unires_api::Error::Timeout { timeout_secs: 5 }.into();
        assert!(!err.is_session_fatal());
        assert_eq!(err.to_string(), "Controller request timed out after 5s");
    }

    #[test]
    fn row_error_skip_classification() {
        assert!(RowError::from(FormatError::EmptyName).is_skip());
        assert!(
            RowError::from(ResolutionError::UnknownVlan {
                vlan: 9,
                available: "1".into()
            })
            .is_skip()
        );
        assert!(!RowError::from(CoreError::Api { message: "x".into() }).is_skip());
    }

    #[test]
    fn missing_columns_lists_names() {
        let err = CoreError::MissingColumns {
            path: "devices.csv".into(),
            missing: vec!["MAC".into(), "IP".into()],
        };
        assert_eq!(
            err.to_string(),
            "CSV file devices.csv is missing required column(s): MAC, IP"
        );
    }
}
