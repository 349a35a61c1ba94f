//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/supplynet/supplynet.toml`
//! 3. Environment variables: `SUPPLYNET_*` prefix
//! 4. `--data` on the command line (applied by the caller)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::HierarchyLimits;
use crate::util::path::expand_env_vars;

/// Raw hierarchy limits for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawHierarchyLimits {
    pub max_level: Option<usize>,
    pub walk_cap: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_file: Option<PathBuf>,
    pub hierarchy: RawHierarchyLimits,
}

/// Unified configuration for supplynet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Catalog data file (default: `<XDG data dir>/supplynet/catalog.toml`)
    pub data_file: PathBuf,
    /// Supplier hierarchy limits
    pub hierarchy: HierarchyLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            hierarchy: HierarchyLimits::default(),
        }
    }
}

fn default_data_file() -> PathBuf {
    ProjectDirs::from("", "", "supplynet")
        .map(|dirs| dirs.data_dir().join("catalog.toml"))
        .unwrap_or_else(|| PathBuf::from("~/.supplynet/catalog.toml"))
}

/// Get the XDG config directory for supplynet.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "supplynet").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("supplynet.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings from the global config location.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings with layered precedence, reading `config_file` if it exists.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.check_limits()?;

        Ok(current)
    }

    /// Overlay values win where specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_file: overlay
                .data_file
                .clone()
                .unwrap_or_else(|| self.data_file.clone()),
            hierarchy: HierarchyLimits {
                max_level: overlay
                    .hierarchy
                    .max_level
                    .unwrap_or(self.hierarchy.max_level),
                walk_cap: overlay
                    .hierarchy
                    .walk_cap
                    .unwrap_or(self.hierarchy.walk_cap),
            },
        }
    }

    /// Apply SUPPLYNET_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SUPPLYNET")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_file") {
            settings.data_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<usize>("hierarchy.max_level") {
            settings.hierarchy.max_level = val;
        }
        if let Ok(val) = config.get::<usize>("hierarchy.walk_cap") {
            settings.hierarchy.walk_cap = val;
        }

        Ok(settings)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in the data file path.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_file.to_string_lossy().as_ref());
        self.data_file = PathBuf::from(expanded);
    }

    /// The walk cap is a safety net above the real depth limit, never below it.
    fn check_limits(&self) -> Result<(), ApplicationError> {
        let HierarchyLimits {
            max_level,
            walk_cap,
        } = self.hierarchy;
        if walk_cap <= max_level {
            return Err(ApplicationError::Config {
                message: format!(
                    "hierarchy.walk_cap ({walk_cap}) must be greater than \
                     hierarchy.max_level ({max_level})"
                ),
            });
        }
        Ok(())
    }

    /// Override the data file, e.g. from `--data`.
    pub fn with_data_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.data_file = path;
            self.expand_paths();
        }
        self
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# supplynet configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/supplynet/supplynet.toml
#   Env:    SUPPLYNET_* environment variables, e.g.
#           SUPPLYNET_DATA_FILE, SUPPLYNET_HIERARCHY__MAX_LEVEL
#   CLI:    --data <FILE>

# Catalog data file
# data_file = "~/.local/share/supplynet/catalog.toml"

[hierarchy]
# Deepest level below a factory (0 factory, 1 retail chain, 2 sole proprietor)
# max_level = 2

# Supplier hops followed before a chain is treated as corrupted.
# Must be greater than max_level.
# walk_cap = 10
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MAX_LEVEL, WALK_CAP};

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None).expect("load defaults");
        assert!(settings.data_file.to_string_lossy().contains("catalog.toml"));
        assert_eq!(settings.hierarchy.max_level, MAX_LEVEL);
        assert_eq!(settings.hierarchy.walk_cap, WALK_CAP);
    }

    #[test]
    fn given_tilde_in_data_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_file: PathBuf::from("~/.supplynet/catalog.toml"),
            hierarchy: HierarchyLimits::default(),
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let data = settings.data_file.to_string_lossy();
        assert!(data.starts_with(&home), "data_file should start with home: {data}");
        assert!(!data.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_values_kept() {
        let base = Settings::default();
        let overlay = RawSettings {
            data_file: None,
            hierarchy: RawHierarchyLimits {
                max_level: Some(3),
                walk_cap: None,
            },
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.data_file, base.data_file);
        assert_eq!(merged.hierarchy.max_level, 3);
        assert_eq!(merged.hierarchy.walk_cap, WALK_CAP);
    }

    #[test]
    fn given_walk_cap_not_above_max_level_when_checking_then_config_error() {
        let settings = Settings {
            data_file: PathBuf::from("catalog.toml"),
            hierarchy: HierarchyLimits {
                max_level: 10,
                walk_cap: 10,
            },
        };

        assert!(matches!(
            settings.check_limits(),
            Err(ApplicationError::Config { .. })
        ));
    }

    #[test]
    fn given_template_then_parses_as_raw_settings() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.data_file.is_none());
        assert!(raw.hierarchy.max_level.is_none());
    }

    #[test]
    fn given_settings_when_rendered_then_contains_hierarchy_section() {
        let text = Settings::default().to_toml().unwrap();
        assert!(text.contains("[hierarchy]"));
        assert!(text.contains("max_level = 2"));
    }
}
