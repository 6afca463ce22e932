use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".fintrack";

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "FINTRACK_HOME";

/// Returns the application-specific data directory, defaulting to `~/.fintrack`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
