//! Loading and saving profiles from unusual files

use std::fs;
use std::path::Path;

use stackctl_core::api::DEFAULT_API_URL;
use stackctl_core::config::{Config, ConfigError, Profile};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[cfg(unix)]
fn running_as_root() -> bool {
    std::process::Command::new("id")
        .arg("-u")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .is_some_and(|uid| uid.trim() == "0")
}

#[test]
fn missing_file_is_an_empty_config() {
    let config = Config::load_from_path(Path::new("/tmp/stackctl-missing/nowhere/config.toml"))
        .expect("a missing file is not an error");
    assert_eq!(config, Config::default());
}

#[test]
fn empty_file_is_an_empty_config() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from_path(&write_config(&dir, "")).unwrap();
    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

#[test]
fn broken_toml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_path(&write_config(&dir, "[[[broken")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().starts_with("invalid config file"), "got: {err}");
}

#[test]
fn project_id_must_be_a_string() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[profiles.dev]\nproject_id = 42\n");
    assert!(matches!(
        Config::load_from_path(&path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn unknown_keys_are_ignored_and_api_url_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
colour = "blue"

[profiles.dev]
project_id = "b9b8a8c4-3a9e-4ad7-9b4f-8e4c3a1b2c3d"
legacy_flag = true
"#,
    );

    let config = Config::load_from_path(&path).unwrap();
    let dev = &config.profiles["dev"];
    assert_eq!(dev.api_url, DEFAULT_API_URL);
    assert!(dev.token.is_none());
}

#[test]
fn save_round_trips_through_nested_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join("config.toml");

    let mut config = Config::default();
    config.set_profile(
        "prod".to_string(),
        Profile {
            token: Some("keyring:prod-token".to_string()),
            project_id: Some("p-1".to_string()),
            region: Some("eu01".to_string()),
            ..Profile::default()
        },
    );
    config.default_profile = Some("prod".to_string());

    config.save_to_path(&path).unwrap();
    assert_eq!(Config::load_from_path(&path).unwrap(), config);
}

#[cfg(unix)]
#[test]
fn unreadable_file_is_a_read_error() {
    use std::os::unix::fs::PermissionsExt;

    if running_as_root() {
        eprintln!("skipping: root can read anything");
        return;
    }

    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "# nothing here");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

    let err = Config::load_from_path(&path).unwrap_err();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    assert!(matches!(err, ConfigError::Read { .. }), "got: {err}");
}

#[cfg(unix)]
#[test]
fn readonly_directory_is_a_write_error() {
    use std::os::unix::fs::PermissionsExt;

    if running_as_root() {
        eprintln!("skipping: root can write anywhere");
        return;
    }

    let dir = TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    let err = Config::default()
        .save_to_path(&locked.join("config.toml"))
        .unwrap_err();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(err, ConfigError::Write { .. }), "got: {err}");
}
