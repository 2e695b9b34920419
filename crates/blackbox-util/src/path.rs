//! Standard locations for blackbox files.

use std::path::PathBuf;

const APP_DIR: &str = "blackbox";

/// Name of the per-project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "blackbox.json";

/// `$XDG_CONFIG_HOME/blackbox`, or `~/.config/blackbox`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_DIR))
}

/// `$XDG_DATA_HOME/blackbox`, or `~/.local/share/blackbox`.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join(APP_DIR))
}

pub fn logs_dir() -> Option<PathBuf> {
    data_dir().map(|p| p.join("logs"))
}

/// The global configuration file.
pub fn global_config_file() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.json"))
}

/// The history database used when none is configured.
pub fn default_database() -> Option<PathBuf> {
    data_dir().map(|p| p.join("history.db"))
}
