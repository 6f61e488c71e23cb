//! Message catalogue shared by both ends of a channel.
//!
//! Every request kind has exactly one response kind that counts as success; the
//! proxies encode that pairing, this module only defines the shapes. Enums are
//! `#[non_exhaustive]` so new intents can be added without breaking peers that
//! match on the existing ones.

pub mod message;
pub mod response;
pub mod result;
pub mod token;

pub use message::{
    ConnectionRequest, DisconnectionMessage, Message, PasswordReplyMessage,
    PasswordRequestMessage, PasswordRequestPurpose, ReconfigurationDeniedMessage,
    ReconfigurationMessage, SimpleMessage, SimpleMessagePurport,
};
pub use response::{
    AuthenticationResponse, ConnectionResponse, DisconnectionResponse, Response, SimpleResponse,
    SimpleResponsePurport,
};
pub use result::CommunicationResult;
pub use token::SessionToken;
