//! Path helpers

use std::path::{Path, PathBuf};

/// Expand environment variables in a path string.
///
/// Supports:
/// - `$VAR` syntax
/// - `${VAR}` syntax
/// - `~` for home directory
///
/// Unknown variables leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Display a path relative to the current directory when it lies below it.
pub fn display_relative(path: &Path) -> PathBuf {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_plain_path_when_expanding_then_unchanged() {
        assert_eq!(expand_env_vars("data/catalog.toml"), "data/catalog.toml");
    }

    #[test]
    fn given_unknown_variable_when_expanding_then_unchanged() {
        let input = "$SUPPLYNET_SURELY_UNSET_VARIABLE/catalog.toml";
        assert_eq!(expand_env_vars(input), input);
    }

    #[test]
    fn given_absolute_path_outside_cwd_when_displaying_then_kept() {
        let path = Path::new("/definitely/not/below/cwd.toml");
        assert_eq!(display_relative(path), path.to_path_buf());
    }
}
