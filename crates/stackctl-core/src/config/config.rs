//! Named profiles persisted as TOML
//!
//! `${VAR}` references in the file are expanded on load.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::api::DEFAULT_API_URL;

/// Environment variable that overrides the profile token
pub const TOKEN_ENV: &str = "STACKCTL_TOKEN";

/// Environment variable that overrides the profile API URL template
pub const API_URL_ENV: &str = "STACKCTL_API_URL";

/// Contents of `config.toml`
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Profile used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Credentials and defaults for one project
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// URL template, `{service}` is replaced by the service name
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token, plain text or a `keyring:` reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Project used when `--project-id` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            project_id: None,
            region: None,
        }
    }
}

impl Profile {
    /// Token to send, `STACKCTL_TOKEN` taking precedence over the stored one
    pub fn resolve_token(&self) -> Result<Option<String>> {
        let store = CredentialStore::new();
        match &self.token {
            Some(token) => store
                .get_credential(token, Some(TOKEN_ENV))
                .map(Some)
                .map_err(|e| ConfigError::Credential(format!("token: {e}"))),
            None => Ok(std::env::var(TOKEN_ENV).ok()),
        }
    }

    /// URL template, `STACKCTL_API_URL` taking precedence
    pub fn resolve_api_url(&self) -> String {
        std::env::var(API_URL_ENV).unwrap_or_else(|_| self.api_url.clone())
    }
}

impl Config {
    /// Pick the profile a command runs against
    ///
    /// An explicit name must exist. Otherwise the default profile, then the
    /// first profile by name. `None` when no profiles are configured.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<Option<String>> {
        if let Some(name) = explicit_profile {
            if !self.profiles.contains_key(name) {
                return Err(ConfigError::ProfileNotFound {
                    name: name.to_string(),
                });
            }
            return Ok(Some(name.to_string()));
        }

        if let Some(ref default) = self.default_profile
            && self.profiles.contains_key(default)
        {
            return Ok(Some(default.clone()));
        }

        Ok(self.list_profiles().first().map(|(name, _)| name.to_string()))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// A missing file loads as an empty config
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let raw = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&Self::expand_env_vars(&raw))?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Write the config, creating parent directories as needed
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(config_path, rendered).map_err(|source| ConfigError::Write {
            path: config_path.display().to_string(),
            source,
        })
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Also forgets the default when it named this profile
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// Profiles ordered by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Platform config directory joined with `config.toml`
    ///
    /// macOS users who already keep `~/.config/stackctl` get that one.
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let xdg_dir = base_dirs.home_dir().join(".config").join("stackctl");
                if xdg_dir.is_dir() {
                    return Ok(xdg_dir.join("config.toml"));
                }
            }
        }

        ProjectDirs::from("cloud", "stackit", "stackctl")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// `${VAR}` and `${VAR:-fallback}`; unknown variables stay verbatim
    fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok())
            .into_owned()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
