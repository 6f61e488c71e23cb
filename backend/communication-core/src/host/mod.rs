//! Accepting side of a channel.
//!
//! # Security
//!
//! - Binds `127.0.0.1` only; non-loopback peers are dropped without a reply
//! - First frame must be a connection request; anything else closes the connection
//! - A configured startup token must be offered in that request
//! - One session at a time; every later frame must carry its token

pub(crate) mod connection_state;
mod handle;
mod handler;
mod server;

pub use handle::CommunicationHostHandle;
pub use handler::RequestHandler;
pub use server::start_communication_host;
