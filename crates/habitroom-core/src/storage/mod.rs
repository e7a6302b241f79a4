mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, LogConfig};
pub use database::{DayOff, HabitDb, Holiday};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the habitroom data directory, creating it if needed.
///
/// `HABITROOM_DATA_DIR` wins when set. Otherwise `~/.config/habitroom/`, or
/// `~/.config/habitroom-dev/` when `HABITROOM_ENV=dev`.
///
/// # Errors
/// Returns an error if no home directory can be found or the directory
/// cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let dir = data_dir_path()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Where [`data_dir`] points, without creating it.
pub(crate) fn data_dir_path() -> Result<PathBuf> {
    let dir = match std::env::var_os("HABITROOM_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .ok_or_else(|| ConfigError::NoDataDir("home directory not found".into()))?
                .join(".config");

            let env = std::env::var("HABITROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitroom-dev")
            } else {
                base_dir.join("habitroom")
            }
        }
    };
    Ok(dir)
}
