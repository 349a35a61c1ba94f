//! Environment overrides for Settings.
//!
//! Kept in its own test binary: the variables are process-wide and would
//! leak into the file-based config tests running in parallel.

use std::path::PathBuf;

use tempfile::TempDir;

use supplynet::config::Settings;
use supplynet::domain::WALK_CAP;

#[test]
fn given_supplynet_env_vars_when_loading_then_override_config_file() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config_file = temp.path().join("supplynet.toml");
    std::fs::write(&config_file, "[hierarchy]\nmax_level = 3\n").unwrap();
    let data_file = temp.path().join("env_catalog.toml");
    std::env::set_var("SUPPLYNET_HIERARCHY__MAX_LEVEL", "5");
    std::env::set_var("SUPPLYNET_DATA_FILE", &data_file);

    // Act
    let from_file = Settings::load_from(Some(&config_file)).expect("load with file");
    let from_env_only = Settings::load_from(None).expect("load without file");

    // Assert
    assert_eq!(from_file.hierarchy.max_level, 5);
    assert_eq!(from_file.hierarchy.walk_cap, WALK_CAP);
    assert_eq!(from_file.data_file, data_file);
    assert_eq!(from_env_only.hierarchy.max_level, 5);
    assert_eq!(from_env_only.data_file, PathBuf::from(&data_file));
}
