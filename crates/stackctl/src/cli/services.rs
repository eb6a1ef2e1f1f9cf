//! Argus and SQLServer Flex command definitions

use clap::Subcommand;
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum ArgusCommands {
    /// Instance credentials
    #[command(subcommand)]
    Credentials(ArgusCredentialsCommands),
}

#[derive(Subcommand, Debug)]
pub enum ArgusCredentialsCommands {
    /// Create credentials (username and password) for an instance
    ///
    /// The password is only shown once and cannot be retrieved later.
    Create {
        /// Instance ID
        #[arg(long)]
        instance_id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum SqlServerFlexCommands {
    /// Instance operations
    #[command(subcommand)]
    Instance(SqlServerFlexInstanceCommands),
}

#[derive(Subcommand, Debug)]
pub enum SqlServerFlexInstanceCommands {
    /// Show details of an instance
    #[command(visible_alias = "get")]
    Describe {
        /// Instance ID
        instance_id: Uuid,
    },
}
