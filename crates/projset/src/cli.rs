//! Clap derive structures for the `projset` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// projset -- view and edit a project's general settings
#[derive(Debug, Parser)]
#[command(
    name = "projset",
    version,
    about = "View and edit project settings from the command line",
    long_about = "Reads a project's general settings (name, slug, team, auto resolve,\n\
        email, data privacy, and client security options) from the project API\n\
        and saves edits back with a single update request.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "PROJSET_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, short = 's', env = "PROJSET_SERVER", global = true)]
    pub server: Option<String>,

    /// Bearer token
    #[arg(long, env = "PROJSET_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Organization slug (overrides profile)
    #[arg(long, env = "PROJSET_ORG", global = true)]
    pub org: Option<String>,

    /// Project slug (overrides profile)
    #[arg(long, env = "PROJSET_PROJECT", global = true)]
    pub project: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PROJSET_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PROJSET_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "PROJSET_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one `key=value` per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the settings form, section by section
    Show(ShowArgs),

    /// List every field the form knows about
    #[command(alias = "f")]
    Fields(FieldsArgs),

    /// Change one or more fields and save
    Set(SetArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared route argument ────────────────────────────────────────────

/// Which project to act on.
#[derive(Debug, Args)]
pub struct RouteArg {
    /// Project as `org/project` (defaults to --org/--project, then the profile)
    #[arg(value_name = "ORG/PROJECT")]
    pub route: Option<String>,
}

// ── Settings commands ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub route: RouteArg,

    /// Only show this section (case-insensitive title prefix)
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(Debug, Args)]
pub struct FieldsArgs {
    #[command(flatten)]
    pub route: RouteArg,
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Project as `org/project` (defaults to --org/--project, then the profile)
    #[arg(long, short = 'r', value_name = "ORG/PROJECT")]
    pub route: Option<String>,

    /// Assignments as `KEY=VALUE`; list fields take comma-separated values
    #[arg(required = true, value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,

    /// Parse each VALUE as a JSON literal
    #[arg(long)]
    pub json: bool,

    /// Print the request body instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a profile value
    Set {
        /// Profile key (server, organization, project, token_env, ca_cert, insecure, timeout)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a token in the system keyring
    SetToken {
        /// Profile to store the token for (defaults to active profile)
        name: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
