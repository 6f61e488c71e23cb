//! Answers returned by the peer.

use crate::data::token::SessionToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SimpleResponsePurport {
    Acknowledged,
    Rejected,
    /// Message carried a token that does not belong to the active session.
    Unauthorized,
    /// Host has no handler for the message.
    UnknownMessage,
}

/// Handshake answer. The host is authoritative: on success, `token` replaces the
/// candidate the client offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionResponse {
    pub established: bool,
    pub token: Option<SessionToken>,
}

impl ConnectionResponse {
    pub const fn established(token: SessionToken) -> Self {
        Self {
            established: true,
            token: Some(token),
        }
    }

    pub const fn rejected() -> Self {
        Self {
            established: false,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectionResponse {
    pub connection_terminated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleResponse {
    pub purport: SimpleResponsePurport,
}

impl SimpleResponse {
    pub const fn new(purport: SimpleResponsePurport) -> Self {
        Self { purport }
    }
}

/// Answer to an authentication request: the peer's process id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthenticationResponse {
    pub process_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Response {
    Simple(SimpleResponse),
    Authentication(AuthenticationResponse),
}

impl Response {
    pub const fn acknowledged() -> Self {
        Response::Simple(SimpleResponse::new(SimpleResponsePurport::Acknowledged))
    }

    pub const fn simple(purport: SimpleResponsePurport) -> Self {
        Response::Simple(SimpleResponse::new(purport))
    }

    pub fn is_acknowledged(&self) -> bool {
        matches!(
            self,
            Response::Simple(SimpleResponse {
                purport: SimpleResponsePurport::Acknowledged
            })
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Response::Simple(simple) => match simple.purport {
                SimpleResponsePurport::Acknowledged => "SimpleResponse(Acknowledged)",
                SimpleResponsePurport::Rejected => "SimpleResponse(Rejected)",
                SimpleResponsePurport::Unauthorized => "SimpleResponse(Unauthorized)",
                SimpleResponsePurport::UnknownMessage => "SimpleResponse(UnknownMessage)",
            },
            Response::Authentication(_) => "AuthenticationResponse",
        }
    }
}

impl From<SimpleResponse> for Response {
    fn from(response: SimpleResponse) -> Self {
        Response::Simple(response)
    }
}

impl From<AuthenticationResponse> for Response {
    fn from(response: AuthenticationResponse) -> Self {
        Response::Authentication(response)
    }
}
