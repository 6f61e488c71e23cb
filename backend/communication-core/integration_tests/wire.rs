use crate::helpers::{
    connect_raw, handshake, is_connection_closed, receive_envelope, send_protobuf,
    start_test_host,
};

use communication_core::proto::{
    IpcClientEnvelope, IpcDisconnectionMessage, IpcSimpleMessage, IpcSimpleMessagePurport,
    IpcSimpleResponsePurport, ipc_client_envelope, ipc_server_envelope,
};

use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use uuid::Uuid;

fn simple(
    request_id: u64,
    session_token: String,
    purport: IpcSimpleMessagePurport,
) -> IpcClientEnvelope {
    IpcClientEnvelope {
        request_id,
        session_token,
        payload: Some(ipc_client_envelope::Payload::Simple(IpcSimpleMessage {
            purport: purport as i32,
        })),
    }
}

/// **VALUE**: Verifies that the handshake must come first.
///
/// **WHY THIS MATTERS**: Skipping the handshake would let any local process send
/// commands without ever proving it holds the startup token.
///
/// **BUG THIS CATCHES**: Would catch the host dispatching a typed message that arrives
/// before the connection request.
#[tokio::test]
async fn given_first_frame_not_handshake_when_sent_then_connection_closed() {
    // GIVEN: A host
    let (handle, handler) = start_test_host(None).await;
    let mut ws = connect_raw(&handle).await;

    // WHEN: The first frame is a shutdown
    send_protobuf(
        &mut ws,
        &simple(1, String::new(), IpcSimpleMessagePurport::Shutdown),
    )
    .await;

    // THEN: Closed without dispatching
    assert!(is_connection_closed(&mut ws).await);
    assert!(handler.received().is_empty());
}

#[tokio::test]
async fn given_session_when_frame_carries_wrong_token_then_unauthorized() {
    // GIVEN: An established raw session
    let (handle, handler) = start_test_host(None).await;
    let mut ws = connect_raw(&handle).await;
    let response = handshake(&mut ws, Uuid::new_v4()).await;
    assert!(response.established);

    // WHEN: Sending with a token the host did not issue
    send_protobuf(
        &mut ws,
        &simple(2, Uuid::new_v4().to_string(), IpcSimpleMessagePurport::Shutdown),
    )
    .await;

    // THEN: Unauthorized, handler untouched
    let envelope = receive_envelope(&mut ws).await;
    assert_eq!(envelope.request_id, 2);
    match envelope.payload {
        Some(ipc_server_envelope::Payload::Simple(simple)) => {
            assert_eq!(simple.purport, IpcSimpleResponsePurport::Unauthorized as i32);
        }
        other => panic!("Expected Unauthorized, got {other:?}"),
    }
    assert!(handler.received().is_empty());
}

/// **VALUE**: Verifies that garbage frames get an empty answer instead of a dropped
/// connection.
///
/// **BUG THIS CATCHES**: Would catch one corrupt frame killing a healthy session.
#[tokio::test]
async fn given_session_when_undecodable_frame_sent_then_empty_envelope_and_session_survives() {
    // GIVEN: An established raw session
    let (handle, _handler) = start_test_host(None).await;
    let mut ws = connect_raw(&handle).await;
    let response = handshake(&mut ws, Uuid::new_v4()).await;
    let token = response.token.expect("issued token");

    // WHEN: Sending bytes that are not a protobuf envelope
    ws.send(WsMessage::Binary(vec![0xff, 0xff, 0xff, 0xff].into()))
        .await
        .expect("sent");

    // THEN: An envelope with no payload
    let envelope = receive_envelope(&mut ws).await;
    assert_eq!(envelope.request_id, 0);
    assert!(envelope.payload.is_none());

    // THEN: The session still works
    send_protobuf(&mut ws, &simple(3, token, IpcSimpleMessagePurport::Ping)).await;
    let envelope = receive_envelope(&mut ws).await;
    assert_eq!(envelope.request_id, 3);
    assert!(matches!(
        envelope.payload,
        Some(ipc_server_envelope::Payload::Simple(simple))
            if simple.purport == IpcSimpleResponsePurport::Acknowledged as i32
    ));
}

/// **VALUE**: Verifies that pings are answered without the handler.
///
/// **BUG THIS CATCHES**: Would catch heartbeat traffic flooding the application
/// handler's log and message history.
#[tokio::test]
async fn given_session_when_ping_sent_then_acknowledged_without_handler() {
    // GIVEN: An established raw session
    let (handle, handler) = start_test_host(None).await;
    let mut ws = connect_raw(&handle).await;
    let token = handshake(&mut ws, Uuid::new_v4())
        .await
        .token
        .expect("issued token");

    // WHEN: Pinging
    send_protobuf(&mut ws, &simple(7, token, IpcSimpleMessagePurport::Ping)).await;

    // THEN: Acknowledged, handler not involved
    let envelope = receive_envelope(&mut ws).await;
    assert_eq!(envelope.request_id, 7);
    assert!(matches!(
        envelope.payload,
        Some(ipc_server_envelope::Payload::Simple(simple))
            if simple.purport == IpcSimpleResponsePurport::Acknowledged as i32
    ));
    assert!(handler.received().is_empty());
}

#[tokio::test]
async fn given_session_when_disconnection_sent_then_terminated_and_closed() {
    // GIVEN: An established raw session
    let (handle, _handler) = start_test_host(None).await;
    let mut ws = connect_raw(&handle).await;
    let token = handshake(&mut ws, Uuid::new_v4())
        .await
        .token
        .expect("issued token");

    // WHEN: Sending a disconnection message
    let farewell = IpcClientEnvelope {
        request_id: 9,
        session_token: token,
        payload: Some(ipc_client_envelope::Payload::Disconnection(
            IpcDisconnectionMessage {},
        )),
    };
    send_protobuf(&mut ws, &farewell).await;

    // THEN: Terminated, then closed
    let envelope = receive_envelope(&mut ws).await;
    assert!(matches!(
        envelope.payload,
        Some(ipc_server_envelope::Payload::DisconnectionResponse(response))
            if response.connection_terminated
    ));
    assert!(is_connection_closed(&mut ws).await);

    // THEN: A new session can start
    let mut next = connect_raw(&handle).await;
    assert!(handshake(&mut next, Uuid::new_v4()).await.established);
}

/// **VALUE**: Verifies that a dropped socket frees the session slot.
///
/// **BUG THIS CATCHES**: Would catch a crashed client locking the service until restart.
#[tokio::test]
async fn given_session_owner_drops_socket_when_new_client_connects_then_accepted() {
    // GIVEN: A raw session that is dropped without a disconnection message
    let (handle, _handler) = start_test_host(None).await;
    let mut first = connect_raw(&handle).await;
    assert!(handshake(&mut first, Uuid::new_v4()).await.established);
    drop(first);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    // WHEN: Another client handshakes
    let mut second = connect_raw(&handle).await;
    let response = handshake(&mut second, Uuid::new_v4()).await;

    // THEN: Accepted
    assert!(response.established);
}
