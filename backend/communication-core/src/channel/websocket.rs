//! WebSocket channel implementation.
//!
//! One background task reads frames and routes each response to the request
//! waiting on the same `request_id`. Writes are serialized behind an async mutex,
//! so any number of callers may have requests in flight at once.

use crate::channel::codec;
use crate::channel::{Channel, ChannelFactory, ChannelState};
use crate::data::{
    ConnectionRequest, ConnectionResponse, DisconnectionMessage, DisconnectionResponse, Message,
    Response, SessionToken,
};
use crate::error::ipc::IpcError;
use crate::proto::{IpcClientEnvelope, IpcServerEnvelope, ipc_client_envelope};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use prost::Message as ProstMessage;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, WsMessage>;
type WsReader = SplitStream<WsStream>;
type PendingMap = HashMap<u64, oneshot::Sender<IpcServerEnvelope>>;

const STATE_OPENED: u8 = 0;
const STATE_CLOSED: u8 = 1;
const STATE_FAULTED: u8 = 2;

/// Opens [`WebSocketChannel`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketChannelFactory;

impl ChannelFactory for WebSocketChannelFactory {
    type Channel = WebSocketChannel;

    async fn create(&self, address: &str) -> Result<WebSocketChannel, IpcError> {
        WebSocketChannel::open(address).await
    }
}

/// Client end of a WebSocket connection to a communication host.
pub struct WebSocketChannel {
    address: String,
    writer: Mutex<WsWriter>,
    pending: Arc<StdMutex<PendingMap>>,
    next_request_id: AtomicU64,
    state: Arc<AtomicU8>,
    reader: JoinHandle<()>,
}

impl WebSocketChannel {
    /// Connect to `address` (`ws://` or `wss://`).
    ///
    /// # Errors
    ///
    /// - [`IpcError::InvalidAddress`] if the address is not a WebSocket URL
    /// - [`IpcError::Io`] if the peer is unreachable or the upgrade fails
    pub async fn open(address: &str) -> Result<Self, IpcError> {
        let url = Url::parse(address)
            .map_err(|e| IpcError::invalid_address(address, e.to_string()))?;

        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(IpcError::invalid_address(
                address,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        let (ws_stream, _) = connect_async(address).await?;
        let (write, read) = ws_stream.split();

        let pending = Arc::new(StdMutex::new(PendingMap::new()));
        let state = Arc::new(AtomicU8::new(STATE_OPENED));
        let reader = tokio::spawn(read_loop(
            read,
            Arc::clone(&pending),
            Arc::clone(&state),
            address.to_string(),
        ));

        info!("Channel opened to {}", address);

        Ok(Self {
            address: address.to_string(),
            writer: Mutex::new(write),
            pending,
            // 0 is reserved for frames the host could not decode
            next_request_id: AtomicU64::new(1),
            state,
            reader,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Write one envelope and wait for the response with the same request id.
    ///
    /// No timeout here; the connection manager bounds every call.
    async fn request(
        &self,
        session_token: String,
        payload: ipc_client_envelope::Payload,
    ) -> Result<IpcServerEnvelope, IpcError> {
        if self.state() != ChannelState::Opened {
            return Err(IpcError::channel_closed(format!(
                "Channel to {} is {:?}",
                self.address,
                self.state()
            )));
        }

        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (response_tx, response_rx) = oneshot::channel();
        let _slot = PendingSlot::register(&self.pending, request_id, response_tx);

        let envelope = IpcClientEnvelope {
            request_id,
            session_token,
            payload: Some(payload),
        };

        {
            let mut writer = self.writer.lock().await;
            writer
                .send(WsMessage::Binary(envelope.encode_to_vec().into()))
                .await
                .map_err(|e| {
                    self.state.store(STATE_FAULTED, Ordering::SeqCst);
                    IpcError::send(format!("Failed to send frame to {}: {e}", self.address))
                })?;
        }

        debug!("Request {} written to {}", request_id, self.address);

        response_rx.await.map_err(|_| {
            IpcError::channel_closed(format!(
                "Channel to {} closed before request {} was answered",
                self.address, request_id
            ))
        })
    }
}

impl Channel for WebSocketChannel {
    async fn connect(&self, request: ConnectionRequest) -> Result<ConnectionResponse, IpcError> {
        let envelope = self
            .request(String::new(), codec::encode_connection_request(&request))
            .await?;
        codec::decode_connection_response(envelope.payload)
    }

    async fn disconnect(
        &self,
        message: DisconnectionMessage,
    ) -> Result<DisconnectionResponse, IpcError> {
        let envelope = self
            .request(message.token.to_string(), codec::encode_disconnection())
            .await?;
        codec::decode_disconnection_response(envelope.payload)
    }

    async fn send(
        &self,
        token: SessionToken,
        message: Message,
    ) -> Result<Option<Response>, IpcError> {
        let envelope = self
            .request(token.to_string(), codec::encode_message(&message))
            .await?;
        codec::decode_response(envelope.payload)
    }

    async fn close(&self) {
        let previous = self.state.swap(STATE_CLOSED, Ordering::SeqCst);
        if previous == STATE_CLOSED {
            return;
        }

        {
            let mut writer = self.writer.lock().await;
            if let Err(e) = writer.close().await {
                debug!("Close frame to {} not delivered: {}", self.address, e);
            }
        }

        self.reader.abort();
        lock_pending(&self.pending).clear();
        info!("Channel to {} closed", self.address);
    }

    fn state(&self) -> ChannelState {
        match self.state.load(Ordering::SeqCst) {
            STATE_OPENED => ChannelState::Opened,
            STATE_CLOSED => ChannelState::Closed,
            _ => ChannelState::Faulted,
        }
    }
}

impl Drop for WebSocketChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Removes the waiter for a request when the request future is dropped, whether it
/// completed, failed or timed out.
struct PendingSlot<'a> {
    pending: &'a StdMutex<PendingMap>,
    request_id: u64,
}

impl<'a> PendingSlot<'a> {
    fn register(
        pending: &'a StdMutex<PendingMap>,
        request_id: u64,
        waiter: oneshot::Sender<IpcServerEnvelope>,
    ) -> Self {
        lock_pending(pending).insert(request_id, waiter);
        Self {
            pending,
            request_id,
        }
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        lock_pending(self.pending).remove(&self.request_id);
    }
}

fn lock_pending(pending: &StdMutex<PendingMap>) -> MutexGuard<'_, PendingMap> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Route incoming frames to their waiters until the socket ends.
///
/// Dropping the pending senders on exit wakes every waiter with a closed-channel error.
async fn read_loop(
    mut read: WsReader,
    pending: Arc<StdMutex<PendingMap>>,
    state: Arc<AtomicU8>,
    address: String,
) {
    while let Some(frame) = read.next().await {
        match frame {
            Ok(WsMessage::Binary(data)) => match IpcServerEnvelope::decode(&data[..]) {
                Ok(envelope) => {
                    let waiter = lock_pending(&pending).remove(&envelope.request_id);
                    match waiter {
                        Some(waiter) => {
                            // Waiter may have timed out in the meantime.
                            let _ = waiter.send(envelope);
                        }
                        None => debug!(
                            "Dropping response {} from {}: nobody waiting",
                            envelope.request_id, address
                        ),
                    }
                }
                Err(e) => warn!("Undecodable frame from {}: {}", address, e),
            },
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Channel to {} faulted: {}", address, e);
                state.store(STATE_FAULTED, Ordering::SeqCst);
                lock_pending(&pending).clear();
                return;
            }
        }
    }

    if state
        .compare_exchange(STATE_OPENED, STATE_CLOSED, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        info!("Channel to {} closed by peer", address);
    }
    lock_pending(&pending).clear();
}
