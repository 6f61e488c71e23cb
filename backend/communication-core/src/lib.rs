//! Client/service communication layer for the lockdown exam browser.
//!
//! The exam client and the enforcement service run as separate processes. This
//! crate gives each side a proxy façade whose operations never fail loudly: every
//! transport, protocol or handshake fault is logged and folded into a
//! [`CommunicationResult`](data::CommunicationResult) with `success == false`.
//!
//! ## Layout
//!
//! - [`data`]: message catalogue, session token, uniform result wrapper
//! - [`channel`]: transport seam plus the WebSocket implementation
//! - [`connection`]: session state machine, handshake, events, heartbeat
//! - [`proxy`]: failsafe executor and the client/service façades
//! - [`host`]: the accepting side of a channel
//! - [`config`]: `link.json` loading and validation

pub mod channel;
pub mod config;
pub mod connection;
pub mod data;
pub mod error;
pub mod host;
pub mod proto;
pub mod proxy;

#[cfg(test)]
mod tests;

pub const LOOPBACK_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 19876;
pub const DEFAULT_ADDRESS: &str =
    const_format::concatcp!("ws://", LOOPBACK_HOSTNAME, ":", DEFAULT_PORT);
