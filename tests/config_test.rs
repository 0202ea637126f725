//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Precedence, lowest to highest: defaults, global file, local file, env vars.
//! Each layer replaces individual keys; untouched keys fall through.
//!
//! Every test uses its own env prefix so parallel tests do not see each other's vars.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;

use dtviz::application::ApplicationError;
use dtviz::config::Settings;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn given_no_files_when_load_then_returns_defaults() {
    let settings = Settings::load_layers(None, None, "DTVIZ_CFGTEST_NONE").unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_file_when_load_then_replaces_only_given_keys() {
    let dir = TempDir::new().unwrap();
    let local = write(
        &dir,
        "local.toml",
        r#"
batch_size = 5

[grid]
columns = 4
"#,
    );

    let settings = Settings::load_layers(None, Some(local.as_path()), "DTVIZ_CFGTEST_LOCAL").unwrap();

    assert_eq!(settings.batch_size, 5);
    assert_eq!(settings.grid.columns, 4);
    assert_eq!(settings.grid.cell_size, 20.0);
    assert_eq!(settings.viewport_width, 1200.0);
    assert_eq!(settings.animation_config().batch_size, 5);
}

#[test]
fn given_global_and_local_when_load_then_local_wins() {
    let dir = TempDir::new().unwrap();
    let global = write(
        &dir,
        "global.toml",
        r#"
batch_size = 7
viewport_width = 900.0
"#,
    );
    let local = write(&dir, "local.toml", "batch_size = 3\n");

    let settings =
        Settings::load_layers(Some(global.as_path()), Some(local.as_path()), "DTVIZ_CFGTEST_LAYERS").unwrap();

    assert_eq!(settings.batch_size, 3);
    assert_eq!(settings.viewport_width, 900.0);
}

#[test]
fn given_missing_global_file_when_load_then_is_skipped() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("absent.toml");

    let settings = Settings::load_layers(Some(global.as_path()), None, "DTVIZ_CFGTEST_NOGLOBAL").unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_missing_local_file_when_load_then_fails() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("absent.toml");

    let err = Settings::load_layers(None, Some(local.as_path()), "DTVIZ_CFGTEST_NOLOCAL").unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_env_vars_when_load_then_override_files() {
    let dir = TempDir::new().unwrap();
    let local = write(
        &dir,
        "local.toml",
        r#"
batch_size = 5

[animation]
segment_duration_ms = 40
"#,
    );
    std::env::set_var("DTVIZ_CFGTEST_ENV_BATCH_SIZE", "9");
    std::env::set_var("DTVIZ_CFGTEST_ENV_LAYOUT__MIN_SPACING", "120");

    let settings = Settings::load_layers(None, Some(local.as_path()), "DTVIZ_CFGTEST_ENV");

    std::env::remove_var("DTVIZ_CFGTEST_ENV_BATCH_SIZE");
    std::env::remove_var("DTVIZ_CFGTEST_ENV_LAYOUT__MIN_SPACING");
    let settings = settings.unwrap();
    assert_eq!(settings.batch_size, 9);
    assert_eq!(settings.layout.min_spacing, 120.0);
    assert_eq!(
        settings.animation_config().segment_duration,
        Duration::from_millis(40)
    );
}

#[test]
fn given_zero_batch_size_when_load_then_rejected() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "local.toml", "batch_size = 0\n");

    let err = Settings::load_layers(None, Some(local.as_path()), "DTVIZ_CFGTEST_ZERO").unwrap_err();

    assert!(err.to_string().contains("batch_size"));
}

#[test]
fn given_home_relative_paths_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "local.toml", "tree_path = \"~/trees/nba.json\"\n");

    let settings = Settings::load_layers(None, Some(local.as_path()), "DTVIZ_CFGTEST_TILDE").unwrap();

    assert!(!settings.tree_path.to_string_lossy().starts_with('~'));
    assert!(settings.tree_path.ends_with("trees/nba.json"));
}

#[test]
fn given_effective_settings_when_serialized_then_round_trips_through_loader() {
    let dir = TempDir::new().unwrap();
    let custom = Settings {
        batch_size: 11,
        viewport_width: 640.0,
        ..Settings::default()
    };
    let local = write(&dir, "effective.toml", &custom.to_toml().unwrap());

    let settings = Settings::load_layers(None, Some(local.as_path()), "DTVIZ_CFGTEST_SHOW").unwrap();

    assert_eq!(settings, custom);
}

#[test]
fn given_template_when_parsed_then_is_valid_toml() {
    let parsed: toml::Value = toml::from_str(&Settings::template()).unwrap();

    assert!(parsed.is_table());
}
