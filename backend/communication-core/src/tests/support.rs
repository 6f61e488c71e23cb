//! Scripted in-memory channel for proxy and connection tests.

use crate::channel::{Channel, ChannelFactory, ChannelState};
use crate::connection::Timeouts;
use crate::data::{
    ConnectionRequest, ConnectionResponse, DisconnectionMessage, DisconnectionResponse, Message,
    Response, SessionToken,
};
use crate::error::ipc::IpcError;

use std::io::{Error as IoError, ErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const TEST_ADDRESS: &str = "ws://127.0.0.1:1";

pub(crate) fn short_timeouts() -> Timeouts {
    Timeouts {
        connect: Duration::from_millis(200),
        send: Duration::from_millis(200),
    }
}

/// How the mock peer answers the handshake.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Handshake {
    Accept(SessionToken),
    AcceptWithoutToken,
    Reject,
    Fail,
    Unreachable,
    Hang,
    /// Accept with the token once the delay has passed.
    AcceptAfter(SessionToken, Duration),
    /// The channel panics while connecting.
    Panic,
    /// The factory panics while opening the channel.
    PanicOnCreate,
}

/// How the mock peer answers every typed message.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Respond(Response),
    Nothing,
    Fail,
    /// Fail and report the channel Faulted, as a dead socket would.
    Drop,
    Panic,
    Hang,
}

pub(crate) struct MockPeer {
    handshake: Mutex<Handshake>,
    reply: Mutex<Reply>,
    sent: Mutex<Vec<(SessionToken, Message)>>,
    offered: Mutex<Vec<SessionToken>>,
    state: Mutex<ChannelState>,
    disconnects: AtomicUsize,
    closes: AtomicUsize,
}

impl MockPeer {
    pub(crate) fn new(handshake: Handshake, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            handshake: Mutex::new(handshake),
            reply: Mutex::new(reply),
            sent: Mutex::new(Vec::new()),
            offered: Mutex::new(Vec::new()),
            state: Mutex::new(ChannelState::Opened),
            disconnects: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
        })
    }

    /// Accepts any handshake with a fresh token and acknowledges everything.
    pub(crate) fn acknowledging() -> Arc<Self> {
        Self::new(
            Handshake::Accept(SessionToken::generate()),
            Reply::Respond(Response::acknowledged()),
        )
    }

    pub(crate) fn set_handshake(&self, handshake: Handshake) {
        *self.handshake.lock().unwrap() = handshake;
    }

    pub(crate) fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub(crate) fn sent(&self) -> Vec<(SessionToken, Message)> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn sent_messages(&self) -> Vec<Message> {
        self.sent().into_iter().map(|(_, message)| message).collect()
    }

    pub(crate) fn offered_tokens(&self) -> Vec<SessionToken> {
        self.offered.lock().unwrap().clone()
    }

    pub(crate) fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockChannel {
    peer: Arc<MockPeer>,
}

impl Channel for MockChannel {
    async fn connect(&self, request: ConnectionRequest) -> Result<ConnectionResponse, IpcError> {
        self.peer.offered.lock().unwrap().push(request.token);
        let handshake = *self.peer.handshake.lock().unwrap();
        match handshake {
            Handshake::Accept(token) => Ok(ConnectionResponse::established(token)),
            Handshake::AcceptWithoutToken => Ok(ConnectionResponse {
                established: true,
                token: None,
            }),
            Handshake::Reject => Ok(ConnectionResponse::rejected()),
            Handshake::Fail | Handshake::Unreachable => {
                Err(IpcError::channel_closed("scripted handshake failure"))
            }
            Handshake::Hang => std::future::pending().await,
            Handshake::AcceptAfter(token, delay) => {
                tokio::time::sleep(delay).await;
                Ok(ConnectionResponse::established(token))
            }
            Handshake::Panic => panic!("scripted handshake panic"),
            Handshake::PanicOnCreate => unreachable!("factory panics before connect"),
        }
    }

    async fn disconnect(
        &self,
        _message: DisconnectionMessage,
    ) -> Result<DisconnectionResponse, IpcError> {
        self.peer.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(DisconnectionResponse {
            connection_terminated: true,
        })
    }

    async fn send(
        &self,
        token: SessionToken,
        message: Message,
    ) -> Result<Option<Response>, IpcError> {
        self.peer.sent.lock().unwrap().push((token, message));
        let reply = self.peer.reply.lock().unwrap().clone();
        match reply {
            Reply::Respond(response) => Ok(Some(response)),
            Reply::Nothing => Ok(None),
            Reply::Fail => Err(IpcError::send("scripted send failure")),
            Reply::Drop => {
                *self.peer.state.lock().unwrap() = ChannelState::Faulted;
                Err(IpcError::channel_closed("scripted connection drop"))
            }
            Reply::Panic => panic!("scripted channel panic"),
            Reply::Hang => std::future::pending().await,
        }
    }

    async fn close(&self) {
        self.peer.closes.fetch_add(1, Ordering::SeqCst);
        let mut state = self.peer.state.lock().unwrap();
        if *state == ChannelState::Opened {
            *state = ChannelState::Closed;
        }
    }

    fn state(&self) -> ChannelState {
        *self.peer.state.lock().unwrap()
    }
}

pub(crate) struct MockFactory {
    peer: Arc<MockPeer>,
}

impl MockFactory {
    pub(crate) fn new(peer: &Arc<MockPeer>) -> Self {
        Self {
            peer: Arc::clone(peer),
        }
    }
}

impl ChannelFactory for MockFactory {
    type Channel = MockChannel;

    async fn create(&self, _address: &str) -> Result<MockChannel, IpcError> {
        let handshake = *self.peer.handshake.lock().unwrap();
        match handshake {
            Handshake::Unreachable => {
                return Err(IpcError::from(IoError::new(
                    ErrorKind::ConnectionRefused,
                    "scripted refusal",
                )));
            }
            Handshake::PanicOnCreate => panic!("scripted factory panic"),
            _ => {}
        }
        // Each new channel starts open.
        *self.peer.state.lock().unwrap() = ChannelState::Opened;
        Ok(MockChannel {
            peer: Arc::clone(&self.peer),
        })
    }
}
