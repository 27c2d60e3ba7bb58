//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use projset_config::ConfigError;
use projset_core::{CoreError, ErrorMap};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to server at {url}")]
    #[diagnostic(
        code(projset::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}\n\
             For self-signed certificates try: projset show --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(projset::auth_failed),
        help(
            "Verify the token for profile '{profile}'.\n\
             Run: projset config set-token {profile}\n\
             Or set PROJSET_TOKEN."
        )
    )]
    AuthFailed { profile: String, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {path}")]
    #[diagnostic(
        code(projset::not_found),
        help("Check the organization and project slugs (ORG/PROJECT).")
    )]
    NotFound { path: String },

    #[error("No project selected")]
    #[diagnostic(
        code(projset::no_route),
        help(
            "Pass ORG/PROJECT, use --org and --project, or set them on the profile:\n\
             projset config set organization <org>\n\
             projset config set project <project>"
        )
    )]
    NoRoute,

    #[error("Unknown field '{key}'")]
    #[diagnostic(
        code(projset::unknown_field),
        help("Run: projset fields to see the fields this project has")
    )]
    UnknownField { key: String },

    // ── Submit ───────────────────────────────────────────────────────
    #[error("The server rejected {} field(s)", errors.len())]
    #[diagnostic(code(projset::rejected))]
    Rejected { errors: ErrorMap },

    #[error("API error: {message}")]
    #[diagnostic(code(projset::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(projset::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(projset::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: projset config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(projset::no_config),
        help(
            "Create a profile with: projset config init\n\
             Or pass --server. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(projset::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(projset::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Aborted")]
    #[diagnostic(code(projset::aborted))]
    Aborted,

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(projset::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON value: {0}")]
    #[diagnostic(code(projset::json), help("With --json, each VALUE must be a JSON literal."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::NoRoute
            | Self::UnknownField { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach CLI context that core errors don't carry.
    pub fn from_core(err: CoreError, profile: &str, timeout_secs: u64) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: profile.into(),
                message,
            },
            CoreError::Timeout => CliError::Timeout {
                seconds: timeout_secs,
            },
            other => other.into(),
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
                profile: "default".into(),
                message,
            },
            CoreError::Timeout => CliError::Timeout { seconds: 0 },
            CoreError::NotFound { path } => CliError::NotFound { path },
            CoreError::UnknownField { key } => CliError::UnknownField { key },
            CoreError::Rejected { errors } => CliError::Rejected { errors },
            err @ (CoreError::ProjectNotLoaded | CoreError::SubmitInFlight) => {
                CliError::ApiError {
                    message: err.to_string(),
                    status: None,
                }
            }
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_exits_with_rejected_code() {
        let err = CliError::from(CoreError::Rejected {
            errors: [("slug".to_owned(), "taken".to_owned())].into(),
        });
        assert_eq!(err.exit_code(), exit_code::REJECTED);
    }

    #[test]
    fn auth_failure_names_the_profile() {
        let err = CliError::from_core(
            CoreError::AuthenticationFailed {
                message: "Invalid token".into(),
            },
            "work",
            30,
        );
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "work"));
    }

    #[test]
    fn timeout_reports_configured_seconds() {
        let err = CliError::from_core(CoreError::Timeout, "default", 12);
        assert_eq!(err.to_string(), "Request timed out after 12s");
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }
}
