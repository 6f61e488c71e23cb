//! Where the service looks for `link.json` and writes its log.
//!
//! - **Linux**: `$XDG_CONFIG_HOME/lockdown`, `$XDG_DATA_HOME/lockdown/logs`
//! - **macOS**: `~/Library/Application Support/lockdown` for both
//! - **Windows**: `%APPDATA%\lockdown`, `%LOCALAPPDATA%\lockdown\logs`

use crate::error::ServiceError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use log::debug;

pub const APP_DIR_NAME: &str = "lockdown";
pub const LOG_DIR_NAME: &str = "logs";

/// Configuration directory, unless the caller supplies one (first CLI argument).
#[track_caller]
pub fn config_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ServiceError> {
    if let Some(dir) = override_dir {
        debug!("Using config directory override: {}", dir.display());
        return Ok(dir);
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| ServiceError::Service {
            message: "No platform config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

#[track_caller]
pub fn log_dir() -> Result<PathBuf, ServiceError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
        .ok_or_else(|| ServiceError::Service {
            message: "No platform data directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}
