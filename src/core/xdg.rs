//! XDG config directory resolution.
//!
//! Only the config side of the XDG layout is used: the loader keeps no
//! data, state or cache files of its own.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "mailbulk";

/// Config directory for mailbulk
///
/// Priority order (highest to lowest):
/// 1. MAILBULK_CONFIG_DIR
/// 2. XDG_CONFIG_HOME/mailbulk
/// 3. ~/.config/mailbulk
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = env::var("MAILBULK_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_DIR);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(APP_DIR)
}

/// Default config file path (`config.toml` in [`config_dir`])
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
