//! Transport seam between the connection manager and the wire.
//!
//! A [`ChannelFactory`] opens one [`Channel`] per session. Channels must accept
//! concurrent requests; the manager never queues on their behalf.
//!
//! The only production transport is [`WebSocketChannel`]: binary protobuf frames
//! over a loopback WebSocket, responses correlated by request id.

pub(crate) mod codec;
mod websocket;

pub use websocket::{WebSocketChannel, WebSocketChannelFactory};

use crate::data::{
    ConnectionRequest, ConnectionResponse, DisconnectionMessage, DisconnectionResponse, Message,
    Response, SessionToken,
};
use crate::error::ipc::IpcError;

use std::future::Future;

/// Liveness of a channel as the channel itself sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Opened,
    /// Closed locally or by the peer.
    Closed,
    /// A read or write failed.
    Faulted,
}

/// One open connection to a peer.
pub trait Channel: Send + Sync + 'static {
    /// Perform the handshake.
    fn connect(
        &self,
        request: ConnectionRequest,
    ) -> impl Future<Output = Result<ConnectionResponse, IpcError>> + Send;

    /// Ask the peer to end the session.
    fn disconnect(
        &self,
        message: DisconnectionMessage,
    ) -> impl Future<Output = Result<DisconnectionResponse, IpcError>> + Send;

    /// Send a typed message under `token`.
    ///
    /// `Ok(None)` means the peer answered without a response payload.
    fn send(
        &self,
        token: SessionToken,
        message: Message,
    ) -> impl Future<Output = Result<Option<Response>, IpcError>> + Send;

    /// Release the underlying connection. Must be safe to call more than once.
    fn close(&self) -> impl Future<Output = ()> + Send;

    fn state(&self) -> ChannelState;
}

/// Opens channels to an address.
pub trait ChannelFactory: Send + Sync + 'static {
    type Channel: Channel;

    fn create(&self, address: &str) -> impl Future<Output = Result<Self::Channel, IpcError>> + Send;
}
