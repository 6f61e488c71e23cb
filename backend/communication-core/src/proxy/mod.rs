//! Proxy façades.
//!
//! One method per application intent. Each sends one message, waits for the answer
//! and returns a [`CommunicationResult`](crate::data::CommunicationResult) that is
//! successful only when the answer has the single kind that request expects.
//!
//! | Operation | Sends | Success response |
//! |---|---|---|
//! | `initiate_shutdown` | `SimpleMessage(Shutdown)` | `SimpleResponse(Acknowledged)` |
//! | `request_authentication` | `SimpleMessage(Authenticate)` | `AuthenticationResponse` |
//! | `request_password` | `PasswordRequestMessage` | `SimpleResponse(Acknowledged)` |
//! | `inform_reconfiguration_denied` | `ReconfigurationDeniedMessage` | `SimpleResponse(Acknowledged)` |
//! | `inform_client_ready` | `SimpleMessage(ClientIsReady)` | `SimpleResponse(Acknowledged)` |
//! | `request_shutdown` | `SimpleMessage(RequestShutdown)` | `SimpleResponse(Acknowledged)` |
//! | `submit_password` | `PasswordReplyMessage` | `SimpleResponse(Acknowledged)` |
//! | `request_reconfiguration` | `ReconfigurationMessage` | `SimpleResponse(Acknowledged)` |
//! | `ping` | `SimpleMessage(Ping)` | `SimpleResponse(Acknowledged)` |

mod client;
mod failsafe;
mod link;
mod service;

pub use client::ClientProxy;
pub use link::ProxyLink;
pub use service::ServiceProxy;
