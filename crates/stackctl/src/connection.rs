//! Connection management for the STACKIT API client

use std::path::PathBuf;

use anyhow::Context;
use stackctl_core::api::{ApiClient, DEFAULT_API_URL};
use stackctl_core::config::config::{API_URL_ENV, TOKEN_ENV};
use stackctl_core::config::{Config, CredentialStore, Profile};
use tracing::{debug, info, trace};

use crate::error::{Result as CliResult, StackCtlError};

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Path of the configuration file in use
    pub fn display_config_path(&self) -> Option<String> {
        self.config_path
            .clone()
            .or_else(|| Config::config_path().ok())
            .map(|p| p.display().to_string())
    }

    /// Environment overrides only apply when no `--config-file` was given
    fn use_env_vars(&self) -> bool {
        self.config_path.is_none()
    }

    fn profile(&self, profile_name: Option<&str>) -> CliResult<Option<(String, &Profile)>> {
        let Some(name) = self.config.resolve_profile(profile_name)? else {
            return Ok(None);
        };
        let profile = self
            .config
            .profiles
            .get(&name)
            .ok_or_else(|| StackCtlError::ProfileNotFound { name: name.clone() })?;
        Ok(Some((name, profile)))
    }

    /// Create an API client from profile credentials with environment variable override support
    ///
    /// `STACKCTL_TOKEN` and `STACKCTL_API_URL` win over the profile unless
    /// `--config-file` was specified, in which case only the file is used.
    pub fn create_api_client(&self, profile_name: Option<&str>) -> CliResult<ApiClient> {
        debug!("Creating API client");
        trace!("Profile name: {:?}", profile_name);

        let use_env_vars = self.use_env_vars();
        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        let profile = self.profile(profile_name)?.map(|(name, profile)| {
            info!("Using profile: {}", name);
            profile
        });

        let token = match profile {
            Some(profile) if use_env_vars => profile.resolve_token()?,
            Some(profile) => profile
                .token
                .as_deref()
                .map(|value| CredentialStore::new().get_credential(value, None))
                .transpose()
                .context("Failed to resolve token")?,
            None if use_env_vars => std::env::var(TOKEN_ENV).ok(),
            None => None,
        }
        .ok_or(StackCtlError::MissingToken)?;

        let api_url = match profile {
            Some(profile) if use_env_vars => profile.resolve_api_url(),
            Some(profile) => profile.api_url.clone(),
            None if use_env_vars => {
                std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            }
            None => DEFAULT_API_URL.to_string(),
        };
        debug!("API URL template: {}", api_url);

        ApiClient::builder()
            .api_url(api_url)
            .token(token)
            .build()
            .map_err(StackCtlError::from)
    }

    /// Resolve the project to operate on
    ///
    /// `--project-id` (or `STACKCTL_PROJECT_ID`) first, then the profile's
    /// `project_id`.
    pub fn resolve_project_id(
        &self,
        explicit: Option<&str>,
        profile_name: Option<&str>,
    ) -> CliResult<String> {
        if let Some(project_id) = explicit.filter(|p| !p.is_empty()) {
            return Ok(project_id.to_string());
        }

        self.profile(profile_name)?
            .and_then(|(_, profile)| profile.project_id.clone())
            .filter(|p| !p.is_empty())
            .ok_or(StackCtlError::MissingProjectId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(profile: Profile) -> ConnectionManager {
        let mut config = Config::default();
        config.set_profile("dev".to_string(), profile);
        ConnectionManager::with_config_path(config, Some(PathBuf::from("/nonexistent.toml")))
    }

    #[test]
    fn test_project_id_flag_wins() {
        let mgr = manager_with(Profile {
            project_id: Some("from-profile".to_string()),
            ..Profile::default()
        });
        assert_eq!(
            mgr.resolve_project_id(Some("from-flag"), None).unwrap(),
            "from-flag"
        );
        assert_eq!(mgr.resolve_project_id(None, None).unwrap(), "from-profile");
    }

    #[test]
    fn test_missing_project_id() {
        let mgr = manager_with(Profile::default());
        assert!(matches!(
            mgr.resolve_project_id(None, Some("dev")),
            Err(StackCtlError::MissingProjectId)
        ));
    }

    #[test]
    fn test_unknown_profile() {
        let mgr = manager_with(Profile::default());
        assert!(matches!(
            mgr.resolve_project_id(None, Some("prod")),
            Err(StackCtlError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_token() {
        let mgr = manager_with(Profile::default());
        assert!(matches!(
            mgr.create_api_client(None),
            Err(StackCtlError::MissingToken)
        ));
    }

    #[test]
    fn test_client_from_profile() {
        let mgr = manager_with(Profile {
            api_url: "http://127.0.0.1:1/{service}".to_string(),
            token: Some("secret".to_string()),
            ..Profile::default()
        });
        let client = mgr.create_api_client(Some("dev")).unwrap();
        assert_eq!(client.api_url(), "http://127.0.0.1:1/{service}");
    }
}
