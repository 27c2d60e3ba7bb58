//! CLI configuration: thin wrapper around `projset_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects the
//! `GlobalOpts` flag overrides (--server, --token, --org, --project, ...).

use std::time::Duration;

use secrecy::SecretString;

use projset_core::{ClientConfig, RouteParams, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use projset_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names, for help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Everything a settings command needs to reach its project.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub client: ClientConfig,
    pub route: RouteParams,
}

/// Build the client config and project route from config file + flags.
///
/// Flags win over the profile; without a profile, `--server` alone is enough.
pub fn resolve(global: &GlobalOpts, route_arg: Option<&str>) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => Some(profile),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None => None,
    };

    let client = client_config(global, profile, &profile_name, &cfg.defaults)?;
    let route = resolve_route(global, profile, route_arg)?;

    Ok(Resolved {
        profile_name,
        client,
        route,
    })
}

/// Pick the project: positional `ORG/PROJECT`, then flags, then profile.
pub fn resolve_route(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    route_arg: Option<&str>,
) -> Result<RouteParams, CliError> {
    if let Some(raw) = route_arg {
        return RouteParams::parse(raw).ok_or_else(|| CliError::Validation {
            field: "ORG/PROJECT".into(),
            reason: format!("expected `org/project`, got '{raw}'"),
        });
    }

    let org = global
        .org
        .clone()
        .or_else(|| profile.and_then(|p| p.organization.clone()));
    let project = global
        .project
        .clone()
        .or_else(|| profile.and_then(|p| p.project.clone()));

    match (org, project) {
        (Some(org), Some(project)) => Ok(RouteParams::new(org, project)),
        _ => Err(CliError::NoRoute),
    }
}

/// Translate a profile + global flags into a `ClientConfig`.
fn client_config(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, CliError> {
    // 1. Server URL (flag > env > profile)
    let url_str = global
        .server
        .as_deref()
        .or(profile.map(|p| p.server.as_str()))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. Token (flag > profile chain)
    let token = match (&global.token, profile) {
        (Some(token), _) => Some(SecretString::from(token.clone())),
        (None, Some(profile)) => projset_config::resolve_token(profile, profile_name),
        (None, None) => None,
    };

    // 3. TLS verification
    let insecure = global.insecure
        || profile
            .and_then(|p| p.insecure)
            .unwrap_or(defaults.insecure);
    let tls = if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ca_path) = profile.and_then(|p| p.ca_cert.clone()) {
        TlsVerification::CustomCa(ca_path)
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ClientConfig {
        url,
        token,
        tls,
        timeout: Duration::from_secs(global.timeout),
    })
}
