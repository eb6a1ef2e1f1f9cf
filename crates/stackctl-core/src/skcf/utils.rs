//! Helpers shared by the cluster and kubeconfig commands

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::{CoreError, Result};

/// Returns true if the project already has a cluster called `name`
pub async fn cluster_exists(client: &ApiClient, project_id: &str, name: &str) -> Result<bool> {
    let clusters = client.list_clusters(project_id).await?;
    Ok(clusters
        .items
        .iter()
        .any(|cluster| cluster.name.as_deref() == Some(name)))
}

/// Write `data` to `path`, creating missing parent directories
///
/// Directories are created with mode 0700 and the file with 0600 on Unix,
/// since a kubeconfig carries cluster credentials.
pub fn write_config_file(path: &Path, data: &str) -> Result<()> {
    if data.is_empty() {
        return Err(CoreError::Validation("no data to write".to_string()));
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_private_dir(dir).map_err(|source| CoreError::Io {
            context: format!("create config directory {}", dir.display()),
            source,
        })?;
    }

    write_private_file(path, data).map_err(|source| CoreError::Io {
        context: format!("write file {}", path.display()),
        source,
    })?;

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Default kubeconfig location
///
/// The first entry of `$KUBECONFIG` if set, otherwise `~/.kube/config`.
pub fn default_kubeconfig_path() -> Result<PathBuf> {
    if let Some(value) = std::env::var_os("KUBECONFIG")
        && let Some(first) = std::env::split_paths(&value).find(|p| !p.as_os_str().is_empty())
    {
        return Ok(first);
    }

    let dirs = BaseDirs::new()
        .ok_or_else(|| CoreError::Config("could not determine home directory".to_string()))?;
    Ok(dirs.home_dir().join(".kube").join("config"))
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, data: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(data.as_bytes())
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, data: &str) -> std::io::Result<()> {
    fs::write(path, data)
}
