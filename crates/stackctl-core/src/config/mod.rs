//! Configuration and profile management
//!
//! Profiles live in a TOML file and carry the API URL template, the bearer
//! token and default project of one account.
//!
//! # Features
//!
//! - Multiple named profiles with a default
//! - Secure token storage using the OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

// Nested config module mirrors the file name
#![allow(clippy::module_inception)]

pub mod config;
pub mod credential;
pub mod error;

pub use config::{Config, Profile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
