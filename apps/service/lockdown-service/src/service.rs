//! Running service: a communication host answering with [`ServiceRequestHandler`].

use crate::error::ServiceError;
use crate::handler::ServiceRequestHandler;

use common::ErrorLocation;
use communication_core::config::LinkConfig;
use communication_core::host::{CommunicationHostHandle, start_communication_host};

use std::panic::Location;

use log::info;

pub struct RunningService {
    host: CommunicationHostHandle,
    handler: ServiceRequestHandler,
}

impl RunningService {
    /// `ws://` address clients connect to.
    pub fn address(&self) -> String {
        self.host.address()
    }

    pub fn handler(&self) -> &ServiceRequestHandler {
        &self.handler
    }

    pub fn is_running(&self) -> bool {
        self.host.is_running()
    }

    /// Resolves once a client sent `RequestShutdown`.
    pub async fn wait_for_shutdown(&self) {
        let mut requested = self.handler.shutdown_requested();
        // The sender lives in `self.handler`, so the channel cannot close here.
        let _ = requested.wait_for(|requested| *requested).await;
    }

    pub fn shutdown(&self) {
        info!("Stopping communication host");
        self.host.shutdown();
    }
}

/// Start the communication host described by `config.host`.
///
/// # Errors
///
/// Returns [`ServiceError::Host`] if the port cannot be bound.
pub async fn start(config: &LinkConfig) -> Result<RunningService, ServiceError> {
    start_with_handler(config, ServiceRequestHandler::new()).await
}

pub async fn start_with_handler(
    config: &LinkConfig,
    handler: ServiceRequestHandler,
) -> Result<RunningService, ServiceError> {
    let host = start_communication_host(&config.host, handler.clone())
        .await
        .map_err(|e| ServiceError::Host {
            message: format!("Failed to start communication host: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    info!("Service listening on {}", host.address());
    Ok(RunningService { host, handler })
}
