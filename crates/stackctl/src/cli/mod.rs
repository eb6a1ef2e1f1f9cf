//! Command line definition
//!
//! Defines the command-line interface using clap. Service commands are
//! grouped by service (`skcf`, `argus`, `sqlserverflex`); local commands
//! (`profile`, `version`, `completions`) never touch the network.

use clap::{Parser, Subcommand};

pub mod services;
pub mod skcf;

pub use services::*;
pub use skcf::*;

/// Command line client for the STACKIT management APIs
#[derive(Parser, Debug)]
#[command(name = "stackctl")]
#[command(version, about = "Command line client for STACKIT cloud services")]
#[command(long_about = "
Command line client for STACKIT cloud services

Mutating commands ask for confirmation and wait until the remote operation
has finished. Use --assume-yes to skip the prompt and --async to return as
soon as the request was accepted.

EXAMPLES:
    # Store a token and default project
    stackctl profile set dev --token \"$TOKEN\" --project-id xxx

    # Create a Cloud Foundry cluster and wait until it is healthy
    stackctl skcf cluster create my-cluster

    # Fetch a kubeconfig valid for 12 hours
    stackctl skcf kubeconfig create my-cluster --expiration 12h

    # JSON output for scripting
    stackctl sqlserverflex instance describe xxx -o json

For more help on a specific command, run:
    stackctl <command> --help
")]
pub struct Cli {
    /// Named profile from the config file
    #[arg(long, short, global = true, env = "STACKCTL_PROFILE")]
    pub profile: Option<String>,

    /// Read profiles from this file instead of the default location
    #[arg(long, global = true, env = "STACKCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Project ID (falls back to the profile's project_id)
    #[arg(long, global = true, env = "STACKCTL_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub assume_yes: bool,

    /// Return once the request was accepted instead of waiting for completion
    #[arg(long = "async", global = true)]
    pub r#async: bool,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output, chosen per command
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Tables
    Table,
}

impl OutputFormat {
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Json | Self::Yaml)
    }

    /// Renderer format for structured data; tables fall back to JSON
    pub fn structured(&self) -> crate::output::OutputFormat {
        match self {
            Self::Yaml => crate::output::OutputFormat::Yaml,
            _ => crate::output::OutputFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cloud Foundry (SKCF) clusters and kubeconfigs
    #[command(subcommand)]
    Skcf(SkcfCommands),

    /// Argus monitoring instances
    #[command(subcommand)]
    Argus(ArgusCommands),

    /// SQLServer Flex instances
    #[command(subcommand)]
    Sqlserverflex(SqlServerFlexCommands),

    /// Manage named profiles
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create a profile with a plain text token
    stackctl profile set dev --token \"$TOKEN\" --project-id xxx

    # Reference an environment variable instead of storing the token
    stackctl profile set ci --token '${STACKIT_SERVICE_ACCOUNT_TOKEN}'

    # List all profiles
    stackctl profile list

    # Make a profile the default
    stackctl profile default dev
")]
    Profile(ProfileCommands),

    /// Print the version
    #[command(visible_alias = "ver")]
    Version,

    /// Print a completion script
    #[command(visible_alias = "comp")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    Elvish,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List profiles, default marked with *
    #[command(visible_alias = "ls")]
    List,

    /// Print where the config file lives
    Path,

    /// Show one profile with its token redacted
    #[command(visible_alias = "get")]
    Show {
        name: String,
    },

    /// Create a profile or change some of its settings
    ///
    /// The global --project-id is stored as the profile's default project.
    #[command(visible_alias = "add", visible_alias = "create")]
    Set {
        /// Profile name
        name: String,

        /// API token (plain text, or a ${VAR} reference)
        #[arg(long)]
        token: Option<String>,

        /// Region, e.g. eu01
        #[arg(long)]
        region: Option<String>,

        /// API URL template; {service} is replaced with the service name
        /// [default: https://{service}.api.stackit.cloud]
        #[arg(long)]
        api_url: Option<String>,

        /// Store the token in the OS keyring instead of the config file
        #[cfg(feature = "secure-storage")]
        #[arg(long, requires = "token")]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "delete")]
    Remove {
        name: String,
    },

    /// Set the default profile
    #[command(name = "default")]
    Default {
        /// Profile name to use when --profile is not given
        name: String,
    },
}
