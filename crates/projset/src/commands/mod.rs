//! Command handlers. Settings commands share one load step; config and
//! completions never touch the network.

pub mod config_cmd;
pub mod settings;

use projset_core::{ProjectClient, ProjectSettings, load_props};
use tracing::debug;

use crate::cli::{Command, GlobalOpts};
use crate::config::{self, Resolved};
use crate::error::CliError;

/// A loaded settings form plus the client that loaded it.
pub struct Session {
    pub resolved: Resolved,
    pub api: ProjectClient,
    pub settings: ProjectSettings,
}

impl Session {
    /// Resolve config, build the client, and load the project.
    pub async fn open(global: &GlobalOpts, route_arg: Option<&str>) -> Result<Self, CliError> {
        let resolved = config::resolve(global, route_arg)?;
        let api = resolved.client.build_client()?;
        debug!(route = %resolved.route, server = %resolved.client.url, "loading project");
        let props = load_props(&api, resolved.route.clone())
            .await
            .map_err(|e| resolved.core_error(e, global))?;
        Ok(Self {
            settings: ProjectSettings::new(props),
            resolved,
            api,
        })
    }
}

impl Resolved {
    /// Map a core error with this session's profile and timeout attached.
    pub fn core_error(&self, err: projset_core::CoreError, global: &GlobalOpts) -> CliError {
        CliError::from_core(err, &self.profile_name, global.timeout)
    }
}

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Show(args) => settings::show(args, global).await,
        Command::Fields(args) => settings::fields(args, global).await,
        Command::Set(args) => settings::set(args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            use clap::CommandFactory;

            let mut cmd = crate::cli::Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "projset", &mut std::io::stdout());
            Ok(())
        }
    }
}
