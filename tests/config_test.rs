//! Integration tests for Settings loading from a config file.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use supplynet::application::ApplicationError;
use supplynet::config::Settings;
use supplynet::domain::{MAX_LEVEL, WALK_CAP};

#[test]
fn given_missing_config_file_when_loading_then_defaults() {
    let temp = TempDir::new().unwrap();

    let settings = Settings::load_from(Some(&temp.path().join("absent.toml"))).unwrap();

    assert_eq!(settings.hierarchy.max_level, MAX_LEVEL);
    assert_eq!(settings.hierarchy.walk_cap, WALK_CAP);
}

#[test]
fn given_config_file_when_loading_then_values_override_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("supplynet.toml");
    let data_file = temp.path().join("catalog.toml");
    fs::write(
        &path,
        format!(
            r#"data_file = "{}"

[hierarchy]
max_level = 3
"#,
            data_file.display()
        ),
    )
    .unwrap();

    // Act
    let settings = Settings::load_from(Some(&path)).expect("load settings");

    // Assert
    assert_eq!(settings.data_file, data_file);
    assert_eq!(settings.hierarchy.max_level, 3);
    assert_eq!(settings.hierarchy.walk_cap, WALK_CAP);
}

#[test]
fn given_walk_cap_below_max_level_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("supplynet.toml");
    fs::write(&path, "[hierarchy]\nmax_level = 5\nwalk_cap = 4\n").unwrap();

    let result = Settings::load_from(Some(&path));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_malformed_toml_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("supplynet.toml");
    fs::write(&path, "[hierarchy\nmax_level = ").unwrap();

    let result = Settings::load_from(Some(&path));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_data_flag_when_overriding_then_wins_over_config() {
    let settings = Settings::load_from(None)
        .unwrap()
        .with_data_file(Some("/tmp/other/catalog.toml".into()));

    assert_eq!(settings.data_file, Path::new("/tmp/other/catalog.toml"));
}
