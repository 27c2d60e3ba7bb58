// ── Runtime connection configuration ──
//
// How to reach the project settings API. Carries the credential and
// connection tuning but never touches disk; the CLI/TUI builds a
// `ClientConfig` (usually via projset-config) and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use projset_api::{ProjectClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs on self-hosted servers).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for talking to one API server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root (e.g. `https://errors.example.com/api/0/`).
    pub url: Url,
    /// Bearer token, when the server requires one.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            token: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Build the HTTP client this config describes.
    pub fn build_client(&self) -> Result<ProjectClient, CoreError> {
        let mut transport = TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
            token: None,
        };
        if let Some(token) = &self.token {
            transport = transport.with_token(token.clone());
        }
        Ok(ProjectClient::new(self.url.clone(), &transport)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builds_client_against_api_root() {
        let mut config = ClientConfig::new(Url::parse("https://errors.example.com/api/0").unwrap());
        config.token = Some(SecretString::from("tok".to_owned()));
        let client = config.build_client().unwrap();
        assert_eq!(client.base_url().as_str(), "https://errors.example.com/api/0/");
    }

    #[test]
    fn missing_ca_file_is_a_connection_error() {
        let mut config = ClientConfig::new(Url::parse("https://errors.example.com/").unwrap());
        config.tls = TlsVerification::CustomCa("/nonexistent/ca.pem".into());
        let err = config.build_client().err().unwrap();
        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
    }
}
