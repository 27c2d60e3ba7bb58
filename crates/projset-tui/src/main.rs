//! `projset-tui`: terminal form for a project's general settings.
//!
//! Built on [ratatui](https://ratatui.rs). Loads one project and its
//! organization through `projset-core`, shows the settings sections as
//! an editable form, and saves the whole form back in one request.
//!
//! Logs are written to a file (default `/tmp/projset-tui.log`) to avoid
//! corrupting the terminal UI.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod event;
mod screens;
mod text_input;
mod theme;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use secrecy::SecretString;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use projset_core::{ClientConfig, RouteParams, SettingsApi, TlsVerification};

use crate::app::App;

/// Terminal form for editing a project's general settings.
#[derive(Parser, Debug)]
#[command(name = "projset-tui", version, about)]
struct Cli {
    /// Project to open as org/project (defaults to the profile's project)
    route: Option<String>,

    /// Config profile to use
    #[arg(short = 'p', long, env = "PROJSET_PROFILE")]
    profile: Option<String>,

    /// API root URL (overrides the profile)
    #[arg(short = 's', long, env = "PROJSET_SERVER")]
    server: Option<String>,

    /// Bearer token (overrides the profile)
    #[arg(long, env = "PROJSET_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Log file path (defaults to /tmp/projset-tui.log)
    #[arg(long, default_value = "/tmp/projset-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may be logged to stdout/stderr
/// while the terminal is in raw mode. Hold the returned guard for the
/// lifetime of the application so logs are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "projset_tui={log_level},projset_core={log_level},projset_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("projset-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the client configuration and default route.
///
/// Priority: CLI flags > config profile. A bare `--server` works without
/// any config file.
fn resolve_connection(cli: &Cli) -> Result<(ClientConfig, Option<RouteParams>)> {
    let cfg = projset_config::load_config_or_default();
    let profile = cfg.profile(cli.profile.as_deref());

    let (mut client_config, profile_route) = match (profile, &cli.server) {
        (Ok((name, profile)), _) => {
            let config = projset_config::profile_to_client_config(profile, name, &cfg.defaults)
                .wrap_err_with(|| format!("profile '{name}' is invalid"))?;
            (config, profile.route())
        }
        (Err(_), Some(server)) => {
            let url: Url = server
                .parse()
                .wrap_err_with(|| format!("invalid server URL: {server}"))?;
            (ClientConfig::new(url), None)
        }
        (Err(e), None) => {
            return Err(eyre!(
                "{e}; pass --server or run `projset config init` first"
            ));
        }
    };

    if let Some(server) = &cli.server {
        client_config.url = server
            .parse()
            .wrap_err_with(|| format!("invalid server URL: {server}"))?;
    }
    if let Some(token) = &cli.token {
        client_config.token = Some(SecretString::from(token.clone()));
    }
    if cli.insecure {
        client_config.tls = TlsVerification::DangerAcceptInvalid;
    }

    let route = match cli.route.as_deref() {
        Some(raw) => Some(
            RouteParams::parse(raw).ok_or_else(|| eyre!("expected org/project, got '{raw}'"))?,
        ),
        None => profile_route,
    };

    Ok((client_config, route))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    // Tracing to file; hold the guard so logs flush on exit
    let _log_guard = setup_tracing(&cli);

    let (client_config, route) = resolve_connection(&cli)?;
    info!(
        server = %client_config.url,
        route = %route.as_ref().map_or_else(|| "(none)".to_owned(), ToString::to_string),
        "starting projset-tui"
    );

    let api: Arc<dyn SettingsApi> = Arc::new(client_config.build_client()?);
    let mut app = App::new(api, route);
    app.run().await?;

    Ok(())
}
