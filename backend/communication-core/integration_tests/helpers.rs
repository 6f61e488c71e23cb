//! Test helpers for communication host integration tests.
//!
//! - Starting a host on an ephemeral loopback port
//! - A recording request handler
//! - Raw WebSocket access for protocol-level checks

use communication_core::config::HostConfig;
use communication_core::connection::Timeouts;
use communication_core::data::{AuthenticationResponse, Message, Response, SimpleMessagePurport};
use communication_core::host::{
    CommunicationHostHandle, RequestHandler, start_communication_host,
};
use communication_core::proto::{
    IpcClientEnvelope, IpcConnectionRequest, IpcConnectionResponse, IpcServerEnvelope,
    ipc_client_envelope, ipc_server_envelope,
};
use communication_core::proxy::ClientProxy;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use prost::Message as ProstMessage;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

pub type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const TEST_PROCESS_ID: u32 = 31337;

/// Acknowledges everything, answers authentication with [`TEST_PROCESS_ID`] and
/// records what it received. Returns no response at all for reconfiguration denials.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    received: Arc<Mutex<Vec<Message>>>,
}

impl RecordingHandler {
    pub fn received(&self) -> Vec<Message> {
        self.received.lock().expect("handler lock").clone()
    }
}

impl RequestHandler for RecordingHandler {
    async fn handle(&self, message: Message) -> Option<Response> {
        self.received
            .lock()
            .expect("handler lock")
            .push(message.clone());

        match message {
            Message::Simple(simple) if simple.purport == SimpleMessagePurport::Authenticate => {
                Some(Response::from(AuthenticationResponse {
                    process_id: TEST_PROCESS_ID,
                }))
            }
            Message::ReconfigurationDenied(_) => None,
            _ => Some(Response::acknowledged()),
        }
    }
}

/// Start a host on an ephemeral port.
pub async fn start_test_host(
    startup_token: Option<Uuid>,
) -> (CommunicationHostHandle, RecordingHandler) {
    let handler = RecordingHandler::default();
    let config = HostConfig {
        port: 0,
        startup_token,
    };
    let handle = start_communication_host(&config, handler.clone())
        .await
        .expect("Failed to start communication host");
    (handle, handler)
}

pub fn test_timeouts() -> Timeouts {
    Timeouts {
        connect: Duration::from_secs(2),
        send: Duration::from_secs(2),
    }
}

pub fn client_proxy(handle: &CommunicationHostHandle) -> ClientProxy {
    ClientProxy::new(
        handle.address(),
        communication_core::channel::WebSocketChannelFactory,
        test_timeouts(),
    )
}

/// Test helper: Connect a raw WebSocket to the host.
pub async fn connect_raw(handle: &CommunicationHostHandle) -> TestSocket {
    let (ws_stream, _) = connect_async(handle.address())
        .await
        .expect("Failed to connect to WebSocket server");
    ws_stream
}

/// Test helper: Send protobuf message over WebSocket.
pub async fn send_protobuf<T: ProstMessage>(ws: &mut TestSocket, message: &T) {
    ws.send(WsMessage::Binary(message.encode_to_vec().into()))
        .await
        .expect("Failed to send message");
}

/// Test helper: Receive and decode a server envelope.
pub async fn receive_envelope(ws: &mut TestSocket) -> IpcServerEnvelope {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("Timed out waiting for a frame")
        .expect("No message received")
        .expect("Error receiving message");

    IpcServerEnvelope::decode(&msg.into_data()[..]).expect("Failed to decode protobuf")
}

/// Test helper: Perform the handshake and return the host's answer.
pub async fn handshake(ws: &mut TestSocket, offered: Uuid) -> IpcConnectionResponse {
    let request = IpcClientEnvelope {
        request_id: 1,
        session_token: String::new(),
        payload: Some(ipc_client_envelope::Payload::ConnectionRequest(
            IpcConnectionRequest {
                token: offered.to_string(),
            },
        )),
    };
    send_protobuf(ws, &request).await;

    let response = receive_envelope(ws).await;
    assert_eq!(response.request_id, 1);
    match response.payload {
        Some(ipc_server_envelope::Payload::ConnectionResponse(resp)) => resp,
        other => panic!("Expected ConnectionResponse, got {other:?}"),
    }
}

/// Test helper: Check that the host closed the connection.
pub async fn is_connection_closed(ws: &mut TestSocket) -> bool {
    match tokio::time::timeout(Duration::from_secs(2), ws.next()).await {
        Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(WsMessage::Close(_)))) => true,
        Ok(Some(Ok(_))) | Err(_) => false,
    }
}
