//! Configuration loading from `~/.hearth/config.toml` with defaults.

use hearth_types::config::{hearth_home, HearthConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Load configuration from a TOML file, with defaults.
///
/// A missing, unreadable, or invalid file yields the defaults; the latter two
/// log a warning.
pub fn load_config(path: Option<&Path>) -> HearthConfig {
    let config_path = path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(default_config_path);

    if !config_path.exists() {
        info!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
        return HearthConfig::default();
    }

    let contents = match std::fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to read config file, using defaults"
            );
            return HearthConfig::default();
        }
    };

    match toml::from_str::<HearthConfig>(&contents) {
        Ok(mut config) => {
            config.data_dir = expand_home(&config.data_dir);
            info!(path = %config_path.display(), "Loaded configuration");
            config
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to parse config, using defaults"
            );
            HearthConfig::default()
        }
    }
}

/// `~/.hearth/config.toml` (or under `HEARTH_HOME`).
pub fn default_config_path() -> PathBuf {
    hearth_home().join("config.toml")
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
