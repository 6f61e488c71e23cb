// Wire frames for the WebSocket transport (package: lockdown.ipc).
//
// Declared with prost derives instead of a .proto build step. Tags are part of the
// wire contract: add new fields and oneof arms with fresh tags, never renumber.
//
// Client -> host: IpcClientEnvelope
// Host -> client: IpcServerEnvelope (absent payload = no response)

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IpcSimpleMessagePurport {
    Unspecified = 0,
    Authenticate = 1,
    ClientIsReady = 2,
    Ping = 3,
    RequestShutdown = 4,
    Shutdown = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IpcSimpleResponsePurport {
    Unspecified = 0,
    Acknowledged = 1,
    Rejected = 2,
    Unauthorized = 3,
    UnknownMessage = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum IpcPasswordRequestPurpose {
    Unspecified = 0,
    LocalAdministrator = 1,
    LocalSettings = 2,
    Settings = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IpcConnectionRequest {
    #[prost(string, tag = "1")]
    pub token: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IpcConnectionResponse {
    #[prost(bool, tag = "1")]
    pub established: bool,
    #[prost(string, optional, tag = "2")]
    pub token: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct IpcDisconnectionMessage {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct IpcDisconnectionResponse {
    #[prost(bool, tag = "1")]
    pub connection_terminated: bool,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct IpcSimpleMessage {
    #[prost(enumeration = "IpcSimpleMessagePurport", tag = "1")]
    pub purport: i32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct IpcSimpleResponse {
    #[prost(enumeration = "IpcSimpleResponsePurport", tag = "1")]
    pub purport: i32,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct IpcAuthenticationResponse {
    #[prost(uint32, tag = "1")]
    pub process_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IpcPasswordRequestMessage {
    #[prost(enumeration = "IpcPasswordRequestPurpose", tag = "1")]
    pub purpose: i32,
    #[prost(string, tag = "2")]
    pub request_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IpcPasswordReplyMessage {
    #[prost(string, tag = "1")]
    pub request_id: ::prost::alloc::string::String,
    #[prost(bool, tag = "2")]
    pub success: bool,
    #[prost(string, tag = "3")]
    pub password: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IpcReconfigurationDeniedMessage {
    #[prost(string, tag = "1")]
    pub reason: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IpcReconfigurationMessage {
    #[prost(string, tag = "1")]
    pub configuration_path: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub resource_url: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IpcClientEnvelope {
    #[prost(uint64, tag = "1")]
    pub request_id: u64,
    /// Empty until the handshake has produced a session token.
    #[prost(string, tag = "2")]
    pub session_token: ::prost::alloc::string::String,
    #[prost(oneof = "ipc_client_envelope::Payload", tags = "3, 4, 5, 6, 7, 8, 9")]
    pub payload: ::core::option::Option<ipc_client_envelope::Payload>,
}

pub mod ipc_client_envelope {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "3")]
        ConnectionRequest(super::IpcConnectionRequest),
        #[prost(message, tag = "4")]
        Disconnection(super::IpcDisconnectionMessage),
        #[prost(message, tag = "5")]
        Simple(super::IpcSimpleMessage),
        #[prost(message, tag = "6")]
        PasswordRequest(super::IpcPasswordRequestMessage),
        #[prost(message, tag = "7")]
        PasswordReply(super::IpcPasswordReplyMessage),
        #[prost(message, tag = "8")]
        ReconfigurationDenied(super::IpcReconfigurationDeniedMessage),
        #[prost(message, tag = "9")]
        Reconfiguration(super::IpcReconfigurationMessage),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IpcServerEnvelope {
    #[prost(uint64, tag = "1")]
    pub request_id: u64,
    #[prost(oneof = "ipc_server_envelope::Payload", tags = "2, 3, 4, 5")]
    pub payload: ::core::option::Option<ipc_server_envelope::Payload>,
}

pub mod ipc_server_envelope {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "2")]
        ConnectionResponse(super::IpcConnectionResponse),
        #[prost(message, tag = "3")]
        DisconnectionResponse(super::IpcDisconnectionResponse),
        #[prost(message, tag = "4")]
        Simple(super::IpcSimpleResponse),
        #[prost(message, tag = "5")]
        Authentication(super::IpcAuthenticationResponse),
    }
}
