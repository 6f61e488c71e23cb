//! Fault taxonomy for the proxy boundary.
//!
//! Faults never leave a proxy operation. The failsafe executor classifies them,
//! logs them, and returns a failed result, so this type exists for diagnostics only.

use crate::error::ipc::IpcError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CommunicationFault {
    /// Peer unreachable, channel disposed or faulted, timeout, frame codec failure.
    #[error("Transport Fault: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    /// Peer answered, but with nothing or with the wrong kind of response.
    #[error("Protocol Fault: {message} {location}")]
    Protocol {
        message: String,
        location: ErrorLocation,
    },

    /// Peer refused the session.
    #[error("Handshake Fault: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
    },
}

impl CommunicationFault {
    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        CommunicationFault::Transport {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn protocol(message: impl Into<String>) -> Self {
        CommunicationFault::Protocol {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn handshake(message: impl Into<String>) -> Self {
        CommunicationFault::Handshake {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Short category label for log lines.
    pub fn category(&self) -> &'static str {
        match self {
            CommunicationFault::Transport { .. } => "transport",
            CommunicationFault::Protocol { .. } => "protocol",
            CommunicationFault::Handshake { .. } => "handshake",
        }
    }
}

impl From<IpcError> for CommunicationFault {
    fn from(error: IpcError) -> Self {
        let location = error.location();
        let message = error.to_string();
        match error {
            IpcError::Handshake { .. } => CommunicationFault::Handshake { message, location },
            IpcError::Protocol { .. } => CommunicationFault::Protocol { message, location },
            _ => CommunicationFault::Transport { message, location },
        }
    }
}
