//! Logging for the lockdown service.
//!
//! Colored stdout for interactive runs and a plain log file for support cases.
//! The communication layer logs through the `log` facade, so its faults end up
//! in the same file.

use crate::error::ServiceError;

use common::ErrorLocation;

use std::fs::File;
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "lockdown-service.log";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Initialize the logger with dual output (stdout + file).
///
/// Safe to call more than once: later calls log a warning and return `Ok`.
/// The log file is opened on every call, so an unusable directory is always
/// reported.
///
/// # Errors
///
/// Returns [`ServiceError::Service`] if the log file cannot be created or a
/// global logger is already installed by someone else.
#[track_caller]
pub fn initialize(log_dir: &Path) -> Result<(), ServiceError> {
    let log_file = fern::log_file(log_dir.join(LOG_FILE_NAME)).map_err(|e| {
        ServiceError::Service {
            message: format!("Failed to create log file: {e}"),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_file);
        if result.is_ok() {
            info!("Logger initialized with level: {LOG_LEVEL:?}");
        }
    });

    result
}

#[track_caller]
fn initialize_internal(log_file: File) -> Result<(), ServiceError> {

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} {origin}",
                date = format_rfc3339(SystemTime::now()),
                level = colors.color(record.level()),
                origin = origin(record),
            ))
        })
        .chain(stdout());

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} {origin}",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                origin = origin(record),
            ))
        })
        .chain(log_file);

    Dispatch::new()
        .level(LOG_LEVEL)
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| ServiceError::Service {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

fn origin(record: &Record) -> String {
    format!(
        "[{}:{}]",
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0)
    )
}
