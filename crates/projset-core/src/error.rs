// ── Core error types ──
//
// User-facing errors from projset-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<projset_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

use crate::model::ErrorMap;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("No project loaded")]
    ProjectNotLoaded,

    #[error("Unknown field: {key}")]
    UnknownField { key: String },

    // ── Submit errors ────────────────────────────────────────────────
    #[error("Changes rejected: {} field error(s)", errors.len())]
    Rejected { errors: ErrorMap },

    #[error("A save is already in progress")]
    SubmitInFlight,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Per-field messages to show after a failed save.
    ///
    /// Only a rejection carries them; every other failure clears the map.
    pub fn field_errors(&self) -> ErrorMap {
        match self {
            Self::Rejected { errors } => errors.clone(),
            _ => ErrorMap::new(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<projset_api::Error> for CoreError {
    fn from(err: projset_api::Error) -> Self {
        match err {
            projset_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            projset_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            projset_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            projset_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            projset_api::Error::NotFound { path } => CoreError::NotFound { path },
            projset_api::Error::Validation { errors, .. } => CoreError::Rejected { errors },
            projset_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            projset_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
