use thiserror::Error;

/// Failure while reading, writing or resolving the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("token could not be resolved: {0}")]
    Credential(String),

    #[cfg(feature = "secure-storage")]
    #[error("keyring: {0}")]
    Keyring(String),

    #[error("no home directory to place the config file in")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
