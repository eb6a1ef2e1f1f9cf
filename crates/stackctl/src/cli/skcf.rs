//! SKCF command definitions

use std::path::PathBuf;
use std::time::Duration;

use clap::Subcommand;
use stackctl_core::parse_duration_arg;

use crate::commands::wait_utils::WaitArgs;

#[derive(Subcommand, Debug)]
pub enum SkcfCommands {
    /// Cluster lifecycle
    #[command(subcommand)]
    Cluster(ClusterCommands),

    /// Kubeconfig retrieval
    #[command(subcommand)]
    Kubeconfig(KubeconfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommands {
    /// Create a cluster
    #[command(after_help = "EXAMPLES:
    # Create a cluster with the default configuration
    stackctl skcf cluster create my-cluster

    # Create a cluster from a payload file
    stackctl skcf cluster create my-cluster --payload @./payload.json

    # Return as soon as the request was accepted
    stackctl skcf cluster create my-cluster --async
")]
    Create {
        /// Cluster name
        name: String,

        /// Request payload as JSON, or a file path prefixed with "@"
        #[arg(long)]
        payload: Option<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Update an existing cluster
    Update {
        /// Cluster name
        name: String,

        /// Request payload as JSON, or a file path prefixed with "@"
        #[arg(long)]
        payload: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a cluster
    #[command(visible_alias = "rm")]
    Delete {
        /// Cluster name
        name: String,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Show details of a cluster
    #[command(visible_alias = "get")]
    Describe {
        /// Cluster name
        name: String,
    },

    /// List clusters of the project
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of entries to show
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        limit: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum KubeconfigCommands {
    /// Create a kubeconfig for a cluster
    #[command(after_help = "EXAMPLES:
    # Write a kubeconfig valid for one hour to the default location
    stackctl skcf kubeconfig create my-cluster

    # Valid for 30 days, written to a custom path
    stackctl skcf kubeconfig create my-cluster --expiration 30d --location ./kubeconfig

    # Print instead of writing
    stackctl skcf kubeconfig create my-cluster --print-only
")]
    Create {
        /// Cluster name
        cluster_name: String,

        /// Lifetime as <value><unit>, unit one of s, m, h, d, M (30 days)
        #[arg(long, value_parser = parse_duration_arg, default_value = "1h")]
        expiration: Duration,

        /// Where to write the kubeconfig (default: $KUBECONFIG or ~/.kube/config)
        #[arg(long, conflicts_with = "print_only")]
        location: Option<PathBuf>,

        /// Print the kubeconfig instead of writing it
        #[arg(long)]
        print_only: bool,
    },

    /// Print a kubectl exec credential for a cluster
    ///
    /// Meant to be called by kubectl through the `exec` section of a
    /// kubeconfig user; the output is always ExecCredential JSON.
    #[command(after_help = "EXAMPLES:
    # kubeconfig user entry
    users:
    - name: my-cluster
      user:
        exec:
          apiVersion: client.authentication.k8s.io/v1
          command: stackctl
          args: [skcf, kubeconfig, login, my-cluster]
          interactiveMode: Never
")]
    Login {
        /// Cluster name
        cluster_name: String,

        /// Lifetime of the issued credential
        #[arg(long, value_parser = parse_duration_arg, default_value = "15m")]
        expiration: Duration,
    },
}
