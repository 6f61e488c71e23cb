use common::ErrorLocation;

use thiserror::Error;

/// Errors that stop the service from starting or running.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Error from this binary (logging, directories, signals)
    #[error("Service Error: {message} {location}")]
    Service {
        message: String,
        location: ErrorLocation,
    },

    /// `link.json` could not be loaded or failed validation
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// The communication host could not be started
    #[error("Host Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },
}
