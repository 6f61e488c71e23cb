//! Requests sent through a proxy.

use crate::data::token::SessionToken;

use common::RedactedSecret;

use uuid::Uuid;

/// Intent carried by a [`SimpleMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SimpleMessagePurport {
    /// Ask the peer to identify itself.
    Authenticate,
    /// Client finished starting up.
    ClientIsReady,
    /// Liveness check used by the heartbeat.
    Ping,
    /// Client asks the service to end the exam session.
    RequestShutdown,
    /// Service tells the client to shut down.
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum PasswordRequestPurpose {
    #[default]
    LocalAdministrator,
    LocalSettings,
    Settings,
}

/// Handshake request carrying the client's candidate token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub token: SessionToken,
}

/// Graceful end of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectionMessage {
    pub token: SessionToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleMessage {
    pub purport: SimpleMessagePurport,
}

impl SimpleMessage {
    pub const fn new(purport: SimpleMessagePurport) -> Self {
        Self { purport }
    }
}

/// Ask the client to prompt the user for a password.
///
/// The answer travels back later as a [`PasswordReplyMessage`] with the same
/// `request_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordRequestMessage {
    pub purpose: PasswordRequestPurpose,
    pub request_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReplyMessage {
    pub request_id: Uuid,
    pub success: bool,
    pub password: RedactedSecret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconfigurationDeniedMessage {
    pub reason: String,
}

/// Client asks the service to restart the session with another configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconfigurationMessage {
    pub configuration_path: String,
    pub resource_url: String,
}

/// Any request that may be sent once a session is established.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Message {
    Simple(SimpleMessage),
    PasswordRequest(PasswordRequestMessage),
    PasswordReply(PasswordReplyMessage),
    ReconfigurationDenied(ReconfigurationDeniedMessage),
    Reconfiguration(ReconfigurationMessage),
}

impl Message {
    /// Short name for log lines. Never includes payload data.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Simple(simple) => match simple.purport {
                SimpleMessagePurport::Authenticate => "SimpleMessage(Authenticate)",
                SimpleMessagePurport::ClientIsReady => "SimpleMessage(ClientIsReady)",
                SimpleMessagePurport::Ping => "SimpleMessage(Ping)",
                SimpleMessagePurport::RequestShutdown => "SimpleMessage(RequestShutdown)",
                SimpleMessagePurport::Shutdown => "SimpleMessage(Shutdown)",
            },
            Message::PasswordRequest(_) => "PasswordRequestMessage",
            Message::PasswordReply(_) => "PasswordReplyMessage",
            Message::ReconfigurationDenied(_) => "ReconfigurationDeniedMessage",
            Message::Reconfiguration(_) => "ReconfigurationMessage",
        }
    }
}

impl From<SimpleMessage> for Message {
    fn from(message: SimpleMessage) -> Self {
        Message::Simple(message)
    }
}

impl From<SimpleMessagePurport> for Message {
    fn from(purport: SimpleMessagePurport) -> Self {
        Message::Simple(SimpleMessage::new(purport))
    }
}

impl From<PasswordRequestMessage> for Message {
    fn from(message: PasswordRequestMessage) -> Self {
        Message::PasswordRequest(message)
    }
}

impl From<PasswordReplyMessage> for Message {
    fn from(message: PasswordReplyMessage) -> Self {
        Message::PasswordReply(message)
    }
}

impl From<ReconfigurationDeniedMessage> for Message {
    fn from(message: ReconfigurationDeniedMessage) -> Self {
        Message::ReconfigurationDenied(message)
    }
}

impl From<ReconfigurationMessage> for Message {
    fn from(message: ReconfigurationMessage) -> Self {
        Message::Reconfiguration(message)
    }
}
