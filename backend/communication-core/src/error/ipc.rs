use common::ErrorLocation;

use std::any::Any;
use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum IpcError {
    #[error("Handshake Error: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {operation} exceeded {timeout_ms}ms {location}")]
    Timeout {
        operation: String,
        timeout_ms: u64,
        location: ErrorLocation,
    },

    #[error("Not Connected Error: {message} {location}")]
    NotConnected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Channel Closed Error: {message} {location}")]
    ChannelClosed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Channel Panicked Error: {message} {location}")]
    ChannelPanicked {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid Address Error: {address}: {reason} {location}")]
    InvalidAddress {
        address: String,
        reason: String,
        location: ErrorLocation,
    },

    #[error("Protocol Error: {message} {location}")]
    Protocol {
        message: String,
        location: ErrorLocation,
    },

    #[error("Protobuf Decode Error: {message} {location}")]
    ProtobufDecode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Protobuf Encode Error: {message} {location}")]
    ProtobufEncode {
        message: String,
        location: ErrorLocation,
    },
}

impl IpcError {
    #[track_caller]
    pub fn handshake(message: impl Into<String>) -> Self {
        IpcError::Handshake {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn send(message: impl Into<String>) -> Self {
        IpcError::Send {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn read(message: impl Into<String>) -> Self {
        IpcError::Read {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        IpcError::Timeout {
            operation: operation.into(),
            timeout_ms,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn not_connected(message: impl Into<String>) -> Self {
        IpcError::NotConnected {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn channel_closed(message: impl Into<String>) -> Self {
        IpcError::ChannelClosed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// A channel implementation panicked; `payload` is the caught unwind payload.
    #[track_caller]
    pub fn channel_panicked(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic payload".to_string()
        };

        IpcError::ChannelPanicked {
            message,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        IpcError::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn protocol(message: impl Into<String>) -> Self {
        IpcError::Protocol {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Where the error was raised.
    pub fn location(&self) -> ErrorLocation {
        match self {
            IpcError::Handshake { location, .. }
            | IpcError::Send { location, .. }
            | IpcError::Read { location, .. }
            | IpcError::Io { location, .. }
            | IpcError::Timeout { location, .. }
            | IpcError::NotConnected { location, .. }
            | IpcError::ChannelClosed { location, .. }
            | IpcError::ChannelPanicked { location, .. }
            | IpcError::InvalidAddress { location, .. }
            | IpcError::Protocol { location, .. }
            | IpcError::ProtobufDecode { location, .. }
            | IpcError::ProtobufEncode { location, .. } => *location,
        }
    }
}

impl From<IoError> for IpcError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        IpcError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<prost::DecodeError> for IpcError {
    #[track_caller]
    fn from(error: prost::DecodeError) -> Self {
        IpcError::ProtobufDecode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<prost::EncodeError> for IpcError {
    #[track_caller]
    fn from(error: prost::EncodeError) -> Self {
        IpcError::ProtobufEncode {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for IpcError {
    #[track_caller]
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        let message = error.to_string();
        let location = ErrorLocation::from(Location::caller());
        match error {
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                IpcError::ChannelClosed { message, location }
            }
            _ => IpcError::Io { message, location },
        }
    }
}
