//! Profile management command implementations

use serde::Serialize;
use stackctl_core::config::{CredentialStore, Profile};
use tracing::{debug, info, trace};

use super::wait_utils::confirm_or_abort;
use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{Result as CliResult, StackCtlError};
use crate::output::{self, print_output, print_rows};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
    project_id: Option<&str>,
    assume_yes: bool,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            token,
            region,
            api_url,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            let update = ProfileUpdate {
                token: token.clone(),
                project_id: project_id.map(str::to_string),
                region: region.clone(),
                api_url: api_url.clone(),
                #[cfg(feature = "secure-storage")]
                use_keyring: *use_keyring,
            };
            handle_set(conn_mgr, name, update)
        }
        Remove { name } => handle_remove(conn_mgr, name, assume_yes),
        Default { name } => handle_default(conn_mgr, name),
    }
}

/// Profile as shown to the user, with the token redacted
#[derive(Debug, Serialize)]
struct ProfileView<'a> {
    name: &'a str,
    is_default: bool,
    api_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
    token: String,
}

fn redact_token(token: Option<&str>) -> String {
    match token {
        None => "(not set)".to_string(),
        Some(t) if CredentialStore::is_keyring_reference(t) => "(keyring)".to_string(),
        Some(t) if t.starts_with("${") => t.to_string(),
        Some(t) => {
            let preview: String = t.chars().take(4).collect();
            format!("{}...", preview)
        }
    }
}

fn view<'a>(
    conn_mgr: &'a ConnectionManager,
    name: &'a str,
    profile: &'a Profile,
) -> ProfileView<'a> {
    ProfileView {
        name,
        is_default: conn_mgr.config.default_profile.as_deref() == Some(name),
        api_url: &profile.api_url,
        project_id: profile.project_id.as_deref(),
        region: profile.region.as_deref(),
        token: redact_token(profile.token.as_deref()),
    }
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());

    let views: Vec<ProfileView<'_>> = profiles
        .iter()
        .map(|(name, profile)| view(conn_mgr, name, profile))
        .collect();

    if output_format.is_structured() {
        print_output(&views, output_format.structured())?;
        return Ok(());
    }

    if views.is_empty() {
        println!("No profiles configured.");
        println!("Use 'stackctl profile set' to create a profile.");
        return Ok(());
    }

    let rows = views
        .iter()
        .map(|v| {
            vec![
                if v.is_default {
                    format!("{}*", v.name)
                } else {
                    v.name.to_string()
                },
                output::cell(v.project_id),
                output::cell(v.region),
                v.api_url.to_string(),
            ]
        })
        .collect();
    print_rows(&["NAME", "PROJECT ID", "REGION", "API URL"], rows);
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let config_path = conn_mgr
        .display_config_path()
        .ok_or_else(|| StackCtlError::Config("could not determine config directory".into()))?;

    if output_format.is_structured() {
        let output_data = serde_json::json!({ "config_path": config_path });
        print_output(&output_data, output_format.structured())?;
    } else {
        println!("{}", config_path);
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: OutputFormat,
) -> CliResult<()> {
    let profile = conn_mgr
        .config
        .profiles
        .get(name)
        .ok_or_else(|| StackCtlError::ProfileNotFound {
            name: name.to_string(),
        })?;
    let data = view(conn_mgr, name, profile);

    let format = match output_format {
        OutputFormat::Json => output::OutputFormat::Json,
        OutputFormat::Yaml => output::OutputFormat::Yaml,
        OutputFormat::Auto | OutputFormat::Table => output::OutputFormat::Table,
    };
    print_output(&data, format)?;
    Ok(())
}

/// Fields given to `profile set`; `None` keeps the stored value
struct ProfileUpdate {
    token: Option<String>,
    project_id: Option<String>,
    region: Option<String>,
    api_url: Option<String>,
    #[cfg(feature = "secure-storage")]
    use_keyring: bool,
}

fn handle_set(conn_mgr: &ConnectionManager, name: &str, update: ProfileUpdate) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    let mut mgr = conn_mgr.clone();
    let existing = mgr.config.profiles.get(name).cloned();
    if existing.is_some() {
        println!(
            "Profile '{}' already exists. Given settings will be updated, others preserved.",
            name
        );
    }
    let mut profile = existing.unwrap_or_default();

    if let Some(token) = update.token {
        #[cfg(feature = "secure-storage")]
        let store = if update.use_keyring {
            CredentialStore::keyring()
        } else {
            CredentialStore::new()
        };
        #[cfg(not(feature = "secure-storage"))]
        let store = CredentialStore::new();

        let key = format!("{}-token", name);
        profile.token = Some(store.store_credential(&key, &token)?);
    }
    if let Some(project_id) = update.project_id {
        profile.project_id = Some(project_id);
    }
    if let Some(region) = update.region {
        profile.region = Some(region);
    }
    if let Some(api_url) = update.api_url {
        profile.api_url = api_url;
    }

    let first_profile = mgr.config.profiles.is_empty();
    mgr.config.set_profile(name.to_string(), profile);
    if first_profile {
        mgr.config.default_profile = Some(name.to_string());
        info!("Profile '{}' set as default", name);
    }

    mgr.save_config()?;
    println!("Profile '{}' saved successfully.", name);
    if first_profile {
        println!("Set as default profile.");
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str, assume_yes: bool) -> CliResult<()> {
    debug!("Removing profile: {}", name);

    let Some(profile) = conn_mgr.config.profiles.get(name) else {
        return Err(StackCtlError::ProfileNotFound { name: name.into() });
    };

    let is_default = conn_mgr.config.default_profile.as_deref() == Some(name);
    if is_default {
        println!("Warning: '{}' is the default profile.", name);
    }

    confirm_or_abort(
        assume_yes,
        &format!("Are you sure you want to remove profile '{}'?", name),
    )?;

    if let Some(token) = &profile.token {
        CredentialStore::new().delete_credential(token)?;
    }

    let mut mgr = conn_mgr.clone();
    mgr.config.remove_profile(name);
    mgr.save_config()?;

    if is_default {
        println!("Default profile cleared.");
    }
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Setting default profile: {}", name);

    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(StackCtlError::ProfileNotFound { name: name.into() });
    }

    let mut mgr = conn_mgr.clone();
    mgr.config.default_profile = Some(name.to_string());
    mgr.save_config()?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}
