//! Communication host WebSocket server.
//!
//! One task accepts connections and owns a `JoinSet` of per-connection tasks, so
//! aborting it tears everything down. Each connection is served sequentially:
//! frames are answered in the order they arrive, tagged with the request id they
//! came with.
//!
//! # Protocol
//!
//! 1. First frame MUST be a connection request; the reply carries the issued token
//! 2. Every later frame must carry that token or is answered `Unauthorized`
//! 3. Pings are acknowledged here; other typed messages go to the [`RequestHandler`]
//! 4. A disconnection message is confirmed, then the connection is closed

use crate::LOOPBACK_HOSTNAME;
use crate::channel::codec::{self, ClientFrame};
use crate::config::HostConfig;
use crate::data::{
    ConnectionResponse, DisconnectionResponse, Message, Response, SessionToken, SimpleMessage,
    SimpleMessagePurport, SimpleResponsePurport,
};
use crate::error::ipc::IpcError;
use crate::host::connection_state::{ConnectionState, SessionSlot};
use crate::host::handle::CommunicationHostHandle;
use crate::host::handler::RequestHandler;
use crate::proto::{IpcClientEnvelope, IpcServerEnvelope, ipc_server_envelope};

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use prost::Message as ProstMessage;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{WebSocketStream, accept_async};

type WsWriter = SplitSink<WebSocketStream<TcpStream>, WsMessage>;

/// Start a host on `127.0.0.1:{config.port}` and serve it in the background.
///
/// # Errors
///
/// Returns [`IpcError::Io`] if the port cannot be bound.
pub async fn start_communication_host<H: RequestHandler>(
    config: &HostConfig,
    handler: H,
) -> Result<CommunicationHostHandle, IpcError> {
    let listener = TcpListener::bind(format!("{LOOPBACK_HOSTNAME}:{}", config.port)).await?;
    let local_addr = listener.local_addr()?;

    info!("Communication host listening on {}", local_addr);
    if config.startup_token.is_none() {
        warn!("Communication host has no startup token; any local process may connect");
    }

    let task = tokio::spawn(accept_loop(
        listener,
        Arc::new(handler),
        config.startup_token.map(SessionToken::from_uuid),
    ));

    Ok(CommunicationHostHandle::new(local_addr, task))
}

async fn accept_loop<H: RequestHandler>(
    listener: TcpListener,
    handler: Arc<H>,
    startup_token: Option<SessionToken>,
) {
    let slot = SessionSlot::default();
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    debug!("Client connecting from {}", addr);
                    let state = ConnectionState::new(startup_token, slot.clone());
                    connections.spawn(handle_connection(
                        stream,
                        addr,
                        state,
                        Arc::clone(&handler),
                    ));
                }
                Err(e) => error!("Failed to accept connection: {}", e),
            },
            Some(finished) = connections.join_next(), if !connections.is_empty() => {
                match finished {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!("Connection ended with error: {}", e),
                    Err(e) if e.is_panic() => error!("Connection task panicked"),
                    Err(_) => {}
                }
            }
        }
    }
}

async fn handle_connection<H: RequestHandler>(
    stream: TcpStream,
    addr: SocketAddr,
    mut state: ConnectionState,
    handler: Arc<H>,
) -> Result<(), IpcError> {
    // SECURITY: Reject non-loopback connections
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback connection from {}", addr);
        return Ok(());
    }

    let ws_stream = accept_async(stream)
        .await
        .map_err(|e| IpcError::handshake(format!("WebSocket handshake failed: {e}")))?;

    let (mut write, mut read) = ws_stream.split();

    // SECURITY: First frame MUST be a connection request
    let first = match read.next().await {
        Some(Ok(WsMessage::Binary(data))) => IpcClientEnvelope::decode(&data[..])?,
        Some(Ok(_)) => {
            warn!("Client {} sent non-binary first frame", addr);
            return Ok(());
        }
        Some(Err(e)) => {
            return Err(IpcError::read(format!(
                "Error reading first frame from {addr}: {e}"
            )));
        }
        None => {
            warn!("Client {} disconnected before the handshake", addr);
            return Ok(());
        }
    };

    let request = match codec::decode_client_payload(first.payload) {
        Ok(ClientFrame::Connect(request)) => request,
        Ok(_) => {
            warn!("Client {} skipped the handshake", addr);
            return Ok(());
        }
        Err(e) => {
            warn!("Client {} sent a malformed handshake: {}", addr, e);
            return Ok(());
        }
    };

    let Some(token) = state.open_session(request.token) else {
        warn!("Rejected handshake from {}", addr);
        let rejected = codec::encode_connection_response(&ConnectionResponse::rejected());
        send_frame(&mut write, first.request_id, Some(rejected)).await?;
        close(&mut write, addr).await;
        return Ok(());
    };

    info!("Session {} established with {}", token, addr);
    let established = codec::encode_connection_response(&ConnectionResponse::established(token));
    send_frame(&mut write, first.request_id, Some(established)).await?;

    while let Some(frame) = read.next().await {
        let data = match frame {
            Ok(WsMessage::Binary(data)) => data,
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                return Err(IpcError::read(format!(
                    "Error reading frame from {addr}: {e}"
                )));
            }
        };

        let envelope = match IpcClientEnvelope::decode(&data[..]) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Undecodable frame from {}: {}", addr, e);
                send_frame(&mut write, 0, None).await?;
                continue;
            }
        };

        let request_id = envelope.request_id;
        let authorized = state.is_authorized(&envelope.session_token);

        let frame = match codec::decode_client_payload(envelope.payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Malformed request {} from {}: {}", request_id, addr, e);
                send_frame(&mut write, request_id, None).await?;
                continue;
            }
        };

        let payload = match frame {
            ClientFrame::Connect(_) => {
                warn!("Client {} repeated the handshake", addr);
                Some(codec::encode_connection_response(
                    &ConnectionResponse::rejected(),
                ))
            }
            _ if !authorized => {
                warn!("Unauthorized request {} from {}", request_id, addr);
                Some(codec::encode_response(&Response::simple(
                    SimpleResponsePurport::Unauthorized,
                )))
            }
            ClientFrame::Disconnect => {
                state.close_session();
                let terminated = DisconnectionResponse {
                    connection_terminated: true,
                };
                send_frame(
                    &mut write,
                    request_id,
                    Some(codec::encode_disconnection_response(&terminated)),
                )
                .await?;
                info!("Session {} ended by {}", token, addr);
                close(&mut write, addr).await;
                return Ok(());
            }
            ClientFrame::Message(Message::Simple(SimpleMessage {
                purport: SimpleMessagePurport::Ping,
            })) => Some(codec::encode_response(&Response::acknowledged())),
            ClientFrame::Message(message) => {
                let kind = message.kind();
                let response = handler.handle(message).await;
                debug!(
                    "{} from {} answered with {}",
                    kind,
                    addr,
                    response.as_ref().map_or("nothing", Response::kind)
                );
                response.as_ref().map(codec::encode_response)
            }
        };

        send_frame(&mut write, request_id, payload).await?;
    }

    info!("Client {} disconnected", addr);
    Ok(())
}

/// `payload == None` is the explicit "no response".
async fn send_frame(
    write: &mut WsWriter,
    request_id: u64,
    payload: Option<ipc_server_envelope::Payload>,
) -> Result<(), IpcError> {
    let envelope = IpcServerEnvelope {
        request_id,
        payload,
    };

    write
        .send(WsMessage::Binary(envelope.encode_to_vec().into()))
        .await
        .map_err(|e| IpcError::send(format!("Failed to send response {request_id}: {e}")))
}

async fn close(write: &mut WsWriter, addr: SocketAddr) {
    if let Err(e) = write.close().await {
        debug!("Close frame to {} not delivered: {}", addr, e);
    }
}
