use lockdown_service::error::ServiceError;
use lockdown_service::logger::initialize as LoggerInitialize;
use lockdown_service::{paths, service};

use common::ErrorLocation;
use communication_core::config::LinkConfig;

use std::env::args_os;
use std::fs::create_dir_all;
use std::panic::Location;
use std::path::PathBuf;

use log::info;

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    let config_dir = paths::config_dir(args_os().nth(1).map(PathBuf::from))?;
    let log_dir = paths::log_dir()?;

    create_dir_all(&log_dir).map_err(|e| ServiceError::Service {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&log_dir)?;

    info!("Lockdown service starting");
    info!("Config directory: {}", config_dir.display());
    info!("Log directory: {}", log_dir.display());

    let config = LinkConfig::load(&config_dir).map_err(|e| ServiceError::Config {
        message: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let running = service::start(&config).await?;

    tokio::select! {
        _ = running.wait_for_shutdown() => info!("Shutdown requested by client"),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|e| ServiceError::Service {
                message: format!("Failed to listen for Ctrl+C: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
            info!("Interrupted");
        }
    }

    running.shutdown();
    info!("Lockdown service stopped");
    Ok(())
}
