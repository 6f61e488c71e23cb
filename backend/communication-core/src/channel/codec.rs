//! Conversions between the message catalogue and protobuf frames.
//!
//! Shared by the WebSocket channel (encodes requests, decodes responses) and the
//! communication host (the reverse). Unknown enum values and malformed tokens are
//! protocol errors, never silently defaulted.

use crate::data::{
    AuthenticationResponse, ConnectionRequest, ConnectionResponse, DisconnectionResponse,
    Message, PasswordReplyMessage, PasswordRequestMessage, PasswordRequestPurpose,
    ReconfigurationDeniedMessage, ReconfigurationMessage, Response, SessionToken, SimpleMessage,
    SimpleMessagePurport, SimpleResponse, SimpleResponsePurport,
};
use crate::error::ipc::IpcError;
use crate::proto::{
    IpcAuthenticationResponse, IpcConnectionRequest, IpcConnectionResponse,
    IpcDisconnectionMessage, IpcDisconnectionResponse, IpcPasswordReplyMessage,
    IpcPasswordRequestMessage, IpcPasswordRequestPurpose, IpcReconfigurationDeniedMessage,
    IpcReconfigurationMessage, IpcSimpleMessage, IpcSimpleMessagePurport, IpcSimpleResponse,
    IpcSimpleResponsePurport, ipc_client_envelope, ipc_server_envelope,
};

use common::RedactedSecret;

use uuid::Uuid;

/// A decoded client frame as the host sees it.
#[derive(Debug)]
pub(crate) enum ClientFrame {
    Connect(ConnectionRequest),
    Disconnect,
    Message(Message),
}

// ============================================
// TOKENS AND IDS
// ============================================

pub(crate) fn parse_token(value: &str) -> Result<SessionToken, IpcError> {
    value
        .parse()
        .map_err(|e| IpcError::protocol(format!("Invalid session token '{value}': {e}")))
}

fn parse_request_id(value: &str) -> Result<Uuid, IpcError> {
    Uuid::parse_str(value)
        .map_err(|e| IpcError::protocol(format!("Invalid request id '{value}': {e}")))
}

// ============================================
// PURPORTS
// ============================================

fn simple_message_purport_to_wire(purport: SimpleMessagePurport) -> IpcSimpleMessagePurport {
    match purport {
        SimpleMessagePurport::Authenticate => IpcSimpleMessagePurport::Authenticate,
        SimpleMessagePurport::ClientIsReady => IpcSimpleMessagePurport::ClientIsReady,
        SimpleMessagePurport::Ping => IpcSimpleMessagePurport::Ping,
        SimpleMessagePurport::RequestShutdown => IpcSimpleMessagePurport::RequestShutdown,
        SimpleMessagePurport::Shutdown => IpcSimpleMessagePurport::Shutdown,
    }
}

fn simple_message_purport_from_wire(value: i32) -> Result<SimpleMessagePurport, IpcError> {
    match IpcSimpleMessagePurport::try_from(value) {
        Ok(IpcSimpleMessagePurport::Authenticate) => Ok(SimpleMessagePurport::Authenticate),
        Ok(IpcSimpleMessagePurport::ClientIsReady) => Ok(SimpleMessagePurport::ClientIsReady),
        Ok(IpcSimpleMessagePurport::Ping) => Ok(SimpleMessagePurport::Ping),
        Ok(IpcSimpleMessagePurport::RequestShutdown) => Ok(SimpleMessagePurport::RequestShutdown),
        Ok(IpcSimpleMessagePurport::Shutdown) => Ok(SimpleMessagePurport::Shutdown),
        Ok(IpcSimpleMessagePurport::Unspecified) | Err(_) => Err(IpcError::protocol(format!(
            "Unknown simple message purport {value}"
        ))),
    }
}

fn simple_response_purport_to_wire(purport: SimpleResponsePurport) -> IpcSimpleResponsePurport {
    match purport {
        SimpleResponsePurport::Acknowledged => IpcSimpleResponsePurport::Acknowledged,
        SimpleResponsePurport::Rejected => IpcSimpleResponsePurport::Rejected,
        SimpleResponsePurport::Unauthorized => IpcSimpleResponsePurport::Unauthorized,
        SimpleResponsePurport::UnknownMessage => IpcSimpleResponsePurport::UnknownMessage,
    }
}

fn simple_response_purport_from_wire(value: i32) -> Result<SimpleResponsePurport, IpcError> {
    match IpcSimpleResponsePurport::try_from(value) {
        Ok(IpcSimpleResponsePurport::Acknowledged) => Ok(SimpleResponsePurport::Acknowledged),
        Ok(IpcSimpleResponsePurport::Rejected) => Ok(SimpleResponsePurport::Rejected),
        Ok(IpcSimpleResponsePurport::Unauthorized) => Ok(SimpleResponsePurport::Unauthorized),
        Ok(IpcSimpleResponsePurport::UnknownMessage) => Ok(SimpleResponsePurport::UnknownMessage),
        Ok(IpcSimpleResponsePurport::Unspecified) | Err(_) => Err(IpcError::protocol(format!(
            "Unknown simple response purport {value}"
        ))),
    }
}

fn password_purpose_to_wire(purpose: PasswordRequestPurpose) -> IpcPasswordRequestPurpose {
    match purpose {
        PasswordRequestPurpose::LocalAdministrator => IpcPasswordRequestPurpose::LocalAdministrator,
        PasswordRequestPurpose::LocalSettings => IpcPasswordRequestPurpose::LocalSettings,
        PasswordRequestPurpose::Settings => IpcPasswordRequestPurpose::Settings,
    }
}

fn password_purpose_from_wire(value: i32) -> Result<PasswordRequestPurpose, IpcError> {
    match IpcPasswordRequestPurpose::try_from(value) {
        Ok(IpcPasswordRequestPurpose::LocalAdministrator) => {
            Ok(PasswordRequestPurpose::LocalAdministrator)
        }
        Ok(IpcPasswordRequestPurpose::LocalSettings) => Ok(PasswordRequestPurpose::LocalSettings),
        Ok(IpcPasswordRequestPurpose::Settings) => Ok(PasswordRequestPurpose::Settings),
        Ok(IpcPasswordRequestPurpose::Unspecified) | Err(_) => Err(IpcError::protocol(format!(
            "Unknown password request purpose {value}"
        ))),
    }
}

// ============================================
// CLIENT -> HOST
// ============================================

pub(crate) fn encode_connection_request(
    request: &ConnectionRequest,
) -> ipc_client_envelope::Payload {
    ipc_client_envelope::Payload::ConnectionRequest(IpcConnectionRequest {
        token: request.token.to_string(),
    })
}

pub(crate) fn encode_disconnection() -> ipc_client_envelope::Payload {
    ipc_client_envelope::Payload::Disconnection(IpcDisconnectionMessage {})
}

pub(crate) fn encode_message(message: &Message) -> ipc_client_envelope::Payload {
    use ipc_client_envelope::Payload;

    match message {
        Message::Simple(simple) => Payload::Simple(IpcSimpleMessage {
            purport: simple_message_purport_to_wire(simple.purport) as i32,
        }),
        Message::PasswordRequest(request) => Payload::PasswordRequest(IpcPasswordRequestMessage {
            purpose: password_purpose_to_wire(request.purpose) as i32,
            request_id: request.request_id.to_string(),
        }),
        Message::PasswordReply(reply) => Payload::PasswordReply(IpcPasswordReplyMessage {
            request_id: reply.request_id.to_string(),
            success: reply.success,
            password: reply.password.expose().to_string(),
        }),
        Message::ReconfigurationDenied(denied) => {
            Payload::ReconfigurationDenied(IpcReconfigurationDeniedMessage {
                reason: denied.reason.clone(),
            })
        }
        Message::Reconfiguration(reconfiguration) => {
            Payload::Reconfiguration(IpcReconfigurationMessage {
                configuration_path: reconfiguration.configuration_path.clone(),
                resource_url: reconfiguration.resource_url.clone(),
            })
        }
    }
}

pub(crate) fn decode_client_payload(
    payload: Option<ipc_client_envelope::Payload>,
) -> Result<ClientFrame, IpcError> {
    use ipc_client_envelope::Payload;

    let payload = payload.ok_or_else(|| IpcError::protocol("Client frame has no payload"))?;

    let message = match payload {
        Payload::ConnectionRequest(request) => {
            return Ok(ClientFrame::Connect(ConnectionRequest {
                token: parse_token(&request.token)?,
            }));
        }
        Payload::Disconnection(_) => return Ok(ClientFrame::Disconnect),
        Payload::Simple(simple) => Message::Simple(SimpleMessage::new(
            simple_message_purport_from_wire(simple.purport)?,
        )),
        Payload::PasswordRequest(request) => Message::PasswordRequest(PasswordRequestMessage {
            purpose: password_purpose_from_wire(request.purpose)?,
            request_id: parse_request_id(&request.request_id)?,
        }),
        Payload::PasswordReply(reply) => Message::PasswordReply(PasswordReplyMessage {
            request_id: parse_request_id(&reply.request_id)?,
            success: reply.success,
            password: RedactedSecret::new(reply.password),
        }),
        Payload::ReconfigurationDenied(denied) => {
            Message::ReconfigurationDenied(ReconfigurationDeniedMessage {
                reason: denied.reason,
            })
        }
        Payload::Reconfiguration(reconfiguration) => {
            Message::Reconfiguration(ReconfigurationMessage {
                configuration_path: reconfiguration.configuration_path,
                resource_url: reconfiguration.resource_url,
            })
        }
    };

    Ok(ClientFrame::Message(message))
}

// ============================================
// HOST -> CLIENT
// ============================================

pub(crate) fn encode_connection_response(
    response: &ConnectionResponse,
) -> ipc_server_envelope::Payload {
    ipc_server_envelope::Payload::ConnectionResponse(IpcConnectionResponse {
        established: response.established,
        token: response.token.map(|token| token.to_string()),
    })
}

pub(crate) fn encode_disconnection_response(
    response: &DisconnectionResponse,
) -> ipc_server_envelope::Payload {
    ipc_server_envelope::Payload::DisconnectionResponse(IpcDisconnectionResponse {
        connection_terminated: response.connection_terminated,
    })
}

pub(crate) fn encode_response(response: &Response) -> ipc_server_envelope::Payload {
    use ipc_server_envelope::Payload;

    match response {
        Response::Simple(simple) => Payload::Simple(IpcSimpleResponse {
            purport: simple_response_purport_to_wire(simple.purport) as i32,
        }),
        Response::Authentication(authentication) => {
            Payload::Authentication(IpcAuthenticationResponse {
                process_id: authentication.process_id,
            })
        }
    }
}

pub(crate) fn decode_connection_response(
    payload: Option<ipc_server_envelope::Payload>,
) -> Result<ConnectionResponse, IpcError> {
    match payload {
        Some(ipc_server_envelope::Payload::ConnectionResponse(response)) => {
            let token = response.token.as_deref().map(parse_token).transpose()?;
            Ok(ConnectionResponse {
                established: response.established,
                token,
            })
        }
        Some(_) => Err(IpcError::protocol(
            "Expected a connection response to the handshake",
        )),
        None => Err(IpcError::handshake("Peer sent no connection response")),
    }
}

pub(crate) fn decode_disconnection_response(
    payload: Option<ipc_server_envelope::Payload>,
) -> Result<DisconnectionResponse, IpcError> {
    match payload {
        Some(ipc_server_envelope::Payload::DisconnectionResponse(response)) => {
            Ok(DisconnectionResponse {
                connection_terminated: response.connection_terminated,
            })
        }
        Some(_) => Err(IpcError::protocol("Expected a disconnection response")),
        None => Err(IpcError::protocol("Peer sent no disconnection response")),
    }
}

/// `Ok(None)` is the explicit "no response" the failsafe executor treats as failure.
pub(crate) fn decode_response(
    payload: Option<ipc_server_envelope::Payload>,
) -> Result<Option<Response>, IpcError> {
    use ipc_server_envelope::Payload;

    match payload {
        None => Ok(None),
        Some(Payload::Simple(simple)) => Ok(Some(Response::Simple(SimpleResponse::new(
            simple_response_purport_from_wire(simple.purport)?,
        )))),
        Some(Payload::Authentication(authentication)) => {
            Ok(Some(Response::Authentication(AuthenticationResponse {
                process_id: authentication.process_id,
            })))
        }
        Some(Payload::ConnectionResponse(_)) | Some(Payload::DisconnectionResponse(_)) => Err(
            IpcError::protocol("Received a session control response to a typed message"),
        ),
    }
}
