use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use stackctl_core::config::Config;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::CommandContext;
use connection::ConnectionManager;
use error::StackCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let loaded = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        Config::load_from_path(&path).map(|config| (config, Some(path)))
    } else {
        debug!("Loading config from default location");
        Config::load().map(|config| (config, None))
    };
    let (config, config_path) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            let e = StackCtlError::from(e);
            e.print_diagnostic();
            std::process::exit(e.exit_code());
        }
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    // First Ctrl-C stops an in-flight wait, a second one exits right away
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping");
            signal_token.cancel();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(error::EXIT_CANCELLED);
        }
    });

    if let Err(e) = execute_command(&cli, &conn_mgr, cancel).await {
        e.print_diagnostic();
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // RUST_LOG beats -v
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "stackctl=warn,stackctl_core=warn",
            1 => "stackctl=info,stackctl_core=info",
            2 => "stackctl=debug,stackctl_core=debug",
            _ => "stackctl=trace,stackctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!(verbose, "logging ready");
}

async fn execute_command(
    cli: &Cli,
    conn_mgr: &ConnectionManager,
    cancel: CancellationToken,
) -> Result<(), StackCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let ctx = CommandContext {
        conn_mgr,
        profile: cli.profile.as_deref(),
        project_id: cli.project_id.as_deref(),
        output: cli.output,
        assume_yes: cli.assume_yes,
        asynchronous: cli.r#async,
        cancel,
    };

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            if cli.output.is_structured() {
                let output_data = serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "name": env!("CARGO_PKG_NAME"),
                });
                output::print_output(&output_data, cli.output.structured())?;
            } else {
                println!("stackctl {}", env!("CARGO_PKG_VERSION"));
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Profile(profile_cmd) => {
            commands::profile::handle_profile_command(
                profile_cmd,
                conn_mgr,
                cli.output,
                cli.project_id.as_deref(),
                cli.assume_yes,
            )
            .await
        }
        Commands::Skcf(skcf_cmd) => commands::skcf::handle_skcf_command(skcf_cmd, &ctx).await,
        Commands::Argus(argus_cmd) => commands::argus::handle_argus_command(argus_cmd, &ctx).await,
        Commands::Sqlserverflex(flex_cmd) => {
            commands::sqlserverflex::handle_sqlserverflex_command(flex_cmd, &ctx).await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!(elapsed = ?duration, "command finished"),
        Err(e) => info!(elapsed = ?duration, error = %e, "command failed"),
    }

    result
}

fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// One-line description of a command for the log, without secrets
fn format_command(command: &Commands) -> String {
    use cli::{ClusterCommands, KubeconfigCommands, ProfileCommands, SkcfCommands};

    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => match cmd {
            ProfileCommands::List => "profile list".to_string(),
            ProfileCommands::Path => "profile path".to_string(),
            ProfileCommands::Show { name } => format!("profile show {}", name),
            ProfileCommands::Set { name, .. } => {
                format!("profile set {} [credentials redacted]", name)
            }
            ProfileCommands::Remove { name } => format!("profile remove {}", name),
            ProfileCommands::Default { name } => format!("profile default {}", name),
        },
        Commands::Skcf(SkcfCommands::Cluster(cmd)) => match cmd {
            ClusterCommands::Create { name, .. } => format!("skcf cluster create {}", name),
            ClusterCommands::Update { name, .. } => format!("skcf cluster update {}", name),
            ClusterCommands::Delete { name, .. } => format!("skcf cluster delete {}", name),
            ClusterCommands::Describe { name } => format!("skcf cluster describe {}", name),
            ClusterCommands::List { .. } => "skcf cluster list".to_string(),
        },
        Commands::Skcf(SkcfCommands::Kubeconfig(KubeconfigCommands::Create {
            cluster_name,
            ..
        })) => format!("skcf kubeconfig create {}", cluster_name),
        Commands::Skcf(SkcfCommands::Kubeconfig(KubeconfigCommands::Login {
            cluster_name,
            ..
        })) => format!("skcf kubeconfig login {}", cluster_name),
        Commands::Argus(cmd) => format!("argus {:?}", cmd),
        Commands::Sqlserverflex(cmd) => format!("sqlserverflex {:?}", cmd),
    }
}
