//! Kubeconfig retrieval and kubectl exec credentials

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use stackctl_core::api::CreateKubeconfigPayload;
use stackctl_core::skcf::{default_kubeconfig_path, write_config_file};
use tracing::{debug, info};

use crate::cli::KubeconfigCommands;
use crate::commands::CommandContext;
use crate::commands::wait_utils::confirm_or_abort;
use crate::error::{Result as CliResult, StackCtlError};
use crate::output::print_output;

pub async fn handle_kubeconfig_command(
    cmd: &KubeconfigCommands,
    ctx: &CommandContext<'_>,
) -> CliResult<()> {
    match cmd {
        KubeconfigCommands::Create {
            cluster_name,
            expiration,
            location,
            print_only,
        } => create(ctx, cluster_name, *expiration, location.as_deref(), *print_only).await,
        KubeconfigCommands::Login {
            cluster_name,
            expiration,
        } => login(ctx, cluster_name, *expiration).await,
    }
}

fn prompt_for(cluster_name: &str, print_only: bool) -> String {
    if print_only {
        format!(
            "Are you sure you want to create a kubeconfig for cluster {:?}?",
            cluster_name
        )
    } else {
        format!(
            "Are you sure you want to create a kubeconfig for cluster {:?}? \
             This will OVERWRITE your current kubeconfig file, if it exists.",
            cluster_name
        )
    }
}

async fn create(
    ctx: &CommandContext<'_>,
    cluster_name: &str,
    expiration: Duration,
    location: Option<&Path>,
    print_only: bool,
) -> CliResult<()> {
    let (client, project_id) = ctx.connect()?;

    let target: Option<PathBuf> = match (print_only, location) {
        (true, _) => None,
        (false, Some(path)) => Some(path.to_path_buf()),
        (false, None) => Some(default_kubeconfig_path()?),
    };

    confirm_or_abort(ctx.assume_yes, &prompt_for(cluster_name, print_only))?;

    let payload = CreateKubeconfigPayload {
        expiration_seconds: Some(expiration.as_secs().to_string()),
    };
    debug!(
        "Requesting kubeconfig for {} valid for {}s",
        cluster_name,
        expiration.as_secs()
    );
    let kubeconfig = client
        .create_kubeconfig(&project_id, cluster_name, &payload)
        .await?;

    let Some(path) = target else {
        if ctx.output.is_structured() {
            print_output(&kubeconfig, ctx.output.structured())?;
        } else {
            let data = kubeconfig
                .kubeconfig
                .as_deref()
                .ok_or_else(|| StackCtlError::ApiError {
                    message: "no kubeconfig returned from the API".to_string(),
                })?;
            println!("{}", data);
        }
        return Ok(());
    };

    write_config_file(&path, kubeconfig.kubeconfig.as_deref().unwrap_or_default())?;
    info!("Kubeconfig written to {}", path.display());

    if ctx.output.is_structured() {
        let data = serde_json::json!({
            "cluster": cluster_name,
            "location": path.display().to_string(),
            "expirationTimestamp": kubeconfig.expiration_timestamp,
        });
        print_output(data, ctx.output.structured())?;
    } else {
        match &kubeconfig.expiration_timestamp {
            Some(expires) => println!(
                "Created kubeconfig file for cluster {} with expiration date {}.",
                cluster_name, expires
            ),
            None => println!("Created kubeconfig file for cluster {}.", cluster_name),
        }
        println!("Config written to {}", path.display());
    }
    Ok(())
}

const EXEC_CREDENTIAL_API_VERSION: &str = "client.authentication.k8s.io/v1";

/// The part of a kubeconfig that carries client credentials
#[derive(Debug, Default, Deserialize)]
struct KubeconfigUsers {
    #[serde(default)]
    users: Vec<NamedUser>,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    #[serde(default)]
    user: UserAuth,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct UserAuth {
    client_certificate_data: Option<String>,
    client_key_data: Option<String>,
    token: Option<String>,
}

/// `ExecCredential` object read by kubectl from an exec plugin's stdout
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecCredential {
    api_version: &'static str,
    kind: &'static str,
    status: ExecCredentialStatus,
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecCredentialStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_certificate_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_key_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration_timestamp: Option<String>,
}

fn bad_kubeconfig(message: impl std::fmt::Display) -> StackCtlError {
    StackCtlError::ApiError {
        message: format!("unusable kubeconfig returned by the API: {}", message),
    }
}

/// Kubeconfigs carry base64 PEM; exec credentials carry the PEM itself
fn decode_pem(field: &str, encoded: &str) -> CliResult<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| bad_kubeconfig(format!("{} is not base64: {}", field, e)))?;
    String::from_utf8(bytes).map_err(|e| bad_kubeconfig(format!("{} is not PEM: {}", field, e)))
}

/// Build an exec credential from the first user entry of `kubeconfig`
fn exec_credential(kubeconfig: &str, expires: Option<&str>) -> CliResult<ExecCredential> {
    let parsed: KubeconfigUsers = serde_yaml::from_str(kubeconfig).map_err(bad_kubeconfig)?;
    let auth = parsed
        .users
        .into_iter()
        .next()
        .map(|named| named.user)
        .ok_or_else(|| bad_kubeconfig("no user entry"))?;

    let mut status = ExecCredentialStatus {
        expiration_timestamp: expires.map(str::to_string),
        token: auth.token,
        ..ExecCredentialStatus::default()
    };
    match (&auth.client_certificate_data, &auth.client_key_data) {
        (Some(cert), Some(key)) => {
            status.client_certificate_data = Some(decode_pem("client-certificate-data", cert)?);
            status.client_key_data = Some(decode_pem("client-key-data", key)?);
        }
        (None, None) if status.token.is_some() => {}
        (None, None) => return Err(bad_kubeconfig("user has neither token nor client certificate")),
        _ => return Err(bad_kubeconfig("client certificate and key must come together")),
    }

    Ok(ExecCredential {
        api_version: EXEC_CREDENTIAL_API_VERSION,
        kind: "ExecCredential",
        status,
    })
}

/// Exec plugins run without a terminal, so there is no confirmation here
async fn login(ctx: &CommandContext<'_>, cluster_name: &str, expiration: Duration) -> CliResult<()> {
    let (client, project_id) = ctx.connect()?;

    let payload = CreateKubeconfigPayload {
        expiration_seconds: Some(expiration.as_secs().to_string()),
    };
    debug!(
        "Issuing exec credential for {} valid for {}s",
        cluster_name,
        expiration.as_secs()
    );
    let kubeconfig = client
        .create_kubeconfig(&project_id, cluster_name, &payload)
        .await?;
    let data = kubeconfig
        .kubeconfig
        .as_deref()
        .ok_or_else(|| bad_kubeconfig("empty response"))?;

    let credential = exec_credential(data, kubeconfig.expiration_timestamp.as_deref())?;
    println!("{}", serde_json::to_string(&credential)?);
    Ok(())
}
