//! Configuration resolution tests
//!
//! Tests the priority order (command line, environment, per-user file,
//! defaults) and graceful degradation for missing or broken files.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate WAVSPLICE_CONFIG are marked with #[serial].

use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;
use wavsplice_common::config::{ConfigResolver, ConfigSource, TomlConfig, CONFIG_ENV_VAR};
use wavsplice_common::FadeCurve;

fn write_config(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_no_config_anywhere_uses_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();

    let loaded = ConfigResolver::new(None)
        .with_user_file(Some(dir.path().join("missing.toml")))
        .load()
        .unwrap();

    assert_eq!(loaded.source, ConfigSource::Defaults);
    assert_eq!(loaded.config, TomlConfig::default());
}

#[test]
#[serial]
fn test_command_line_takes_precedence() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(&dir, "cli.toml", "[splice]\nfade_curve = \"linear\"\n");
    let envfile = write_config(&dir, "env.toml", "[splice]\nfade_curve = \"q\"\n");
    env::set_var(CONFIG_ENV_VAR, &envfile);

    let loaded = ConfigResolver::new(Some(cli.clone())).load().unwrap();

    assert_eq!(loaded.source, ConfigSource::CommandLine(cli));
    assert_eq!(loaded.config.splice.fade_curve().unwrap(), FadeCurve::Linear);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_environment_over_user_file() {
    let dir = TempDir::new().unwrap();
    let envfile = write_config(&dir, "env.toml", "[scan]\ntrack_number_width = 2\n");
    let user = write_config(&dir, "user.toml", "[scan]\ntrack_number_width = 5\n");
    env::set_var(CONFIG_ENV_VAR, &envfile);

    let loaded = ConfigResolver::new(None)
        .with_user_file(Some(user))
        .load()
        .unwrap();

    assert_eq!(loaded.source, ConfigSource::Environment(envfile));
    assert_eq!(loaded.config.scan.prefix_width(), Some(2));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_user_file_used_when_no_overrides() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let user = write_config(&dir, "user.toml", "[trim]\nthreshold = \"-40dB\"\n");

    let loaded = ConfigResolver::new(None)
        .with_user_file(Some(user.clone()))
        .load()
        .unwrap();

    assert_eq!(loaded.source, ConfigSource::UserFile(user));
    assert_eq!(loaded.config.trim.threshold, "-40dB");
}

#[test]
#[serial]
fn test_broken_user_file_degrades_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let user = write_config(&dir, "user.toml", "[splice\noverlap_seconds = ");

    let loaded = ConfigResolver::new(None)
        .with_user_file(Some(user))
        .load()
        .unwrap();

    assert_eq!(loaded.source, ConfigSource::Defaults);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();

    let result = ConfigResolver::new(Some(dir.path().join("nope.toml"))).load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_malformed_environment_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let envfile = write_config(&dir, "env.toml", "[splice]\noverlap_seconds = \"soon\"\n");
    env::set_var(CONFIG_ENV_VAR, &envfile);

    let result = ConfigResolver::new(None).with_user_file(None).load();
    assert!(result.is_err());

    env::remove_var(CONFIG_ENV_VAR);
}
