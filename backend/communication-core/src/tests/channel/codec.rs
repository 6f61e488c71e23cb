use crate::channel::codec::{self, ClientFrame};
use crate::data::{
    ConnectionRequest, Message, PasswordReplyMessage, PasswordRequestMessage,
    PasswordRequestPurpose, Response, SessionToken, SimpleMessagePurport, SimpleResponsePurport,
};
use crate::error::ipc::IpcError;
use crate::proto::{
    IpcConnectionResponse, IpcDisconnectionResponse, IpcSimpleMessage, IpcSimpleResponse,
    IpcSimpleResponsePurport, ipc_client_envelope, ipc_server_envelope,
};

use common::RedactedSecret;

use uuid::Uuid;

/// **VALUE**: Verifies that a password request crosses the wire with purpose and id intact.
///
/// **WHY THIS MATTERS**: The requester matches the later reply by `request_id` and the
/// prompt text depends on `purpose`. A swapped purpose shows the wrong prompt.
///
/// **BUG THIS CATCHES**: Would catch a purpose mapping off by one between the catalogue
/// enum and the wire enum.
#[test]
fn given_password_request_when_encoded_and_decoded_then_fields_preserved() {
    // GIVEN: A password request for the settings password
    let request_id = Uuid::new_v4();
    let message = Message::from(PasswordRequestMessage {
        purpose: PasswordRequestPurpose::LocalSettings,
        request_id,
    });

    // WHEN: Encoding for the wire and decoding on the host side
    let frame = codec::decode_client_payload(Some(codec::encode_message(&message)))
        .expect("decodable");

    // THEN: Identical message
    match frame {
        ClientFrame::Message(decoded) => assert_eq!(decoded, message),
        other => panic!("expected a typed message, got {other:?}"),
    }
}

/// **VALUE**: Verifies that a password reply keeps its secret through the codec.
///
/// **BUG THIS CATCHES**: Would catch encoding the redacted Display form
/// (`[REDACTED]`) instead of the password itself.
#[test]
fn given_password_reply_when_encoded_then_secret_transmitted() {
    // GIVEN: A reply with a password
    let message = Message::from(PasswordReplyMessage {
        request_id: Uuid::new_v4(),
        success: true,
        password: RedactedSecret::new("s3cret"),
    });

    // WHEN: Round-tripping through the codec
    let frame = codec::decode_client_payload(Some(codec::encode_message(&message)))
        .expect("decodable");

    // THEN: The host sees the actual password
    match frame {
        ClientFrame::Message(Message::PasswordReply(reply)) => {
            assert_eq!(reply.password.expose(), "s3cret");
            assert!(reply.success);
        }
        other => panic!("expected a password reply, got {other:?}"),
    }
}

#[test]
fn given_connection_request_when_decoded_then_connect_frame() {
    // GIVEN: A handshake payload
    let token = SessionToken::generate();
    let payload = codec::encode_connection_request(&ConnectionRequest { token });

    // WHEN: Decoding
    let frame = codec::decode_client_payload(Some(payload)).expect("decodable");

    // THEN: Connect frame with the offered token
    assert!(matches!(frame, ClientFrame::Connect(request) if request.token == token));
}

/// **VALUE**: Verifies that unknown purports are rejected instead of defaulted.
///
/// **WHY THIS MATTERS**: A newer peer may add purports. Mapping an unknown value to
/// some existing purport would make the host act on a message it does not understand.
///
/// **BUG THIS CATCHES**: Would catch `unwrap_or_default()` on the wire enum.
#[test]
fn given_unknown_purport_when_decoded_then_protocol_error() {
    // GIVEN: Simple messages with an unspecified and an out-of-range purport
    for purport in [0, 99] {
        let payload = ipc_client_envelope::Payload::Simple(IpcSimpleMessage { purport });

        // WHEN: Decoding
        let result = codec::decode_client_payload(Some(payload));

        // THEN: Protocol error
        assert!(
            matches!(result, Err(IpcError::Protocol { .. })),
            "purport {purport} must be rejected"
        );
    }
}

#[test]
fn given_no_client_payload_when_decoded_then_protocol_error() {
    assert!(matches!(
        codec::decode_client_payload(None),
        Err(IpcError::Protocol { .. })
    ));
}

/// **VALUE**: Verifies that an absent response payload decodes to "no response".
///
/// **WHY THIS MATTERS**: The host answers undecodable or unhandled requests with an
/// empty envelope. The proxy must see `None` (a failure), not an error that looks like
/// a broken transport.
#[test]
fn given_empty_server_payload_when_decoded_then_none() {
    let decoded = codec::decode_response(None).expect("empty payload is valid");
    assert!(decoded.is_none());
}

#[test]
fn given_simple_response_when_decoded_then_purport_preserved() {
    // GIVEN: An Unauthorized response on the wire
    let payload = codec::encode_response(&Response::simple(SimpleResponsePurport::Unauthorized));

    // WHEN: Decoding on the client side
    let decoded = codec::decode_response(Some(payload)).expect("decodable");

    // THEN: Same purport
    assert_eq!(
        decoded,
        Some(Response::simple(SimpleResponsePurport::Unauthorized))
    );
}

/// **BUG THIS CATCHES**: Would catch a session control response being accepted as the
/// answer to a typed message.
#[test]
fn given_disconnection_response_when_decoded_as_response_then_protocol_error() {
    let payload = ipc_server_envelope::Payload::DisconnectionResponse(IpcDisconnectionResponse {
        connection_terminated: true,
    });

    assert!(matches!(
        codec::decode_response(Some(payload)),
        Err(IpcError::Protocol { .. })
    ));
}

#[test]
fn given_handshake_answered_with_simple_response_then_protocol_error() {
    let payload = ipc_server_envelope::Payload::Simple(IpcSimpleResponse {
        purport: IpcSimpleResponsePurport::Acknowledged as i32,
    });

    assert!(matches!(
        codec::decode_connection_response(Some(payload)),
        Err(IpcError::Protocol { .. })
    ));
}

#[test]
fn given_handshake_answered_with_nothing_then_handshake_error() {
    assert!(matches!(
        codec::decode_connection_response(None),
        Err(IpcError::Handshake { .. })
    ));
}

#[test]
fn given_connection_response_with_bad_token_then_protocol_error() {
    // GIVEN: An accepted handshake whose token is not a UUID
    let payload = ipc_server_envelope::Payload::ConnectionResponse(IpcConnectionResponse {
        established: true,
        token: Some("nope".to_string()),
    });

    // THEN: Rejected as malformed
    assert!(matches!(
        codec::decode_connection_response(Some(payload)),
        Err(IpcError::Protocol { .. })
    ));
}

#[test]
fn given_ping_when_encoded_then_decodes_to_ping() {
    let payload = codec::encode_message(&Message::from(SimpleMessagePurport::Ping));

    let frame = codec::decode_client_payload(Some(payload)).expect("decodable");

    assert!(matches!(
        frame,
        ClientFrame::Message(Message::Simple(simple))
            if simple.purport == SimpleMessagePurport::Ping
    ));
}
