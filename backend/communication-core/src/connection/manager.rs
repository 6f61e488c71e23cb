//! Owns the session and the channel it runs on.
//!
//! All session state sits behind one `RwLock`. The lock is never held across a
//! network round trip: operations snapshot what they need, release the lock, talk
//! to the channel, then re-acquire it to commit the transition. Concurrent sends
//! therefore only contend inside the channel.
//!
//! Channel implementations are not trusted: a panic inside one is caught and
//! handled as a transport fault, and a `connect` future dropped mid-handshake
//! does not leave the session stuck in Connecting.

use crate::channel::{Channel, ChannelFactory, ChannelState, WebSocketChannelFactory};
use crate::connection::events::{ConnectionEvent, EventQueue};
use crate::connection::heartbeat::{self, HeartbeatHandle};
use crate::connection::session::{Session, SessionState};
use crate::data::{ConnectionRequest, DisconnectionMessage, Message, Response, SessionToken};
use crate::error::CommunicationFault;
use crate::error::ipc::IpcError;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::{RwLock, broadcast};
use tokio::time::timeout;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bounds on a handshake and on a single request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub send: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            send: DEFAULT_SEND_TIMEOUT,
        }
    }
}

struct Bound<C> {
    session: Session,
    channel: Option<Arc<C>>,
}

type SharedBound<C> = Arc<RwLock<Bound<C>>>;

/// Faults the handshake it was created for unless disarmed, so a `connect`
/// future dropped before committing releases the Connecting state.
struct HandshakeGuard<C: Channel> {
    bound: SharedBound<C>,
    attempt: u64,
    address: String,
    armed: bool,
}

impl<C: Channel> HandshakeGuard<C> {
    /// `false` once a disconnect and a newer handshake replaced this one.
    fn is_current(&self, session: &Session) -> bool {
        session.attempt() == self.attempt
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<C: Channel> Drop for HandshakeGuard<C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        warn!("Handshake with {} cancelled", self.address);
        let attempt = self.attempt;
        let cancel = move |bound: &mut Bound<C>| {
            if bound.session.attempt() == attempt {
                bound.session.abort_handshake(true);
            }
        };

        match self.bound.try_write() {
            Ok(mut bound) => cancel(&mut *bound),
            Err(_) => {
                // Lock busy: finish the transition on the runtime instead.
                if let Ok(runtime) = Handle::try_current() {
                    let bound = Arc::clone(&self.bound);
                    runtime.spawn(async move {
                        cancel(&mut *bound.write().await);
                    });
                }
            }
        }
    }
}

/// Connects to one peer and keeps at most one session with it.
///
/// There is no internal retry. A caller that wants to reconnect after
/// [`ConnectionEvent::ConnectionLost`] calls [`connect`](Self::connect) again.
pub struct ConnectionManager<F: ChannelFactory = WebSocketChannelFactory> {
    address: String,
    factory: F,
    timeouts: Timeouts,
    bound: SharedBound<F::Channel>,
    events: EventQueue,
}

impl<F: ChannelFactory> ConnectionManager<F> {
    pub fn new(address: impl Into<String>, factory: F, timeouts: Timeouts) -> Self {
        Self {
            address: address.into(),
            factory,
            timeouts,
            bound: Arc::new(RwLock::new(Bound {
                session: Session::default(),
                channel: None,
            })),
            events: EventQueue::new(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    pub async fn state(&self) -> SessionState {
        self.bound.read().await.session.state()
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == SessionState::Connected
    }

    /// Token issued by the peer for the live session.
    pub async fn session_token(&self) -> Option<SessionToken> {
        self.bound.read().await.session.token()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Open a channel and perform the handshake with `candidate`.
    ///
    /// Returns `true` once the session is Connected. The session token is then the
    /// one the peer issued, which may differ from `candidate`.
    ///
    /// Returns `false` without touching the live session if a handshake is already
    /// outstanding or a session is Connected. A rejected handshake leaves the state
    /// Disconnected; an open failure, timeout or malformed answer leaves it Faulted.
    pub async fn connect(&self, candidate: SessionToken) -> bool {
        let (stale, mut guard) = {
            let mut bound = self.bound.write().await;
            if !bound.session.begin_handshake() {
                warn!(
                    "Connect to {} refused: session is {:?}",
                    self.address,
                    bound.session.state()
                );
                return false;
            }
            let guard = HandshakeGuard {
                bound: Arc::clone(&self.bound),
                attempt: bound.session.attempt(),
                address: self.address.clone(),
                armed: true,
            };
            (bound.channel.take(), guard)
        };

        if let Some(stale) = stale {
            close_contained(&*stale, &self.address).await;
        }

        info!("Connecting to {}", self.address);

        let outcome = self
            .bounded(
                "connect",
                self.timeouts.connect,
                contained(self.handshake(candidate)),
            )
            .await;

        match outcome {
            Ok((channel, token)) => {
                let abandoned = {
                    let mut bound = self.bound.write().await;
                    if guard.is_current(&bound.session) && bound.session.establish(token) {
                        bound.channel = Some(Arc::clone(&channel));
                        false
                    } else {
                        true
                    }
                };
                guard.disarm();

                if abandoned {
                    // disconnect() ran while the handshake was outstanding
                    info!("Handshake with {} abandoned", self.address);
                    close_contained(&*channel, &self.address).await;
                    return false;
                }

                info!("Connected to {} (session {})", self.address, token);
                self.events.publish(ConnectionEvent::Connected { token });
                true
            }
            Err(error) => {
                let fault = CommunicationFault::from(error);
                let faulted = !matches!(fault, CommunicationFault::Handshake { .. });
                {
                    let mut bound = self.bound.write().await;
                    if guard.is_current(&bound.session) {
                        bound.session.abort_handshake(faulted);
                    }
                }
                guard.disarm();
                warn!(
                    "Connect to {} failed [{}]: {}",
                    self.address,
                    fault.category(),
                    fault
                );
                false
            }
        }
    }

    async fn handshake(
        &self,
        candidate: SessionToken,
    ) -> Result<(Arc<F::Channel>, SessionToken), IpcError> {
        let channel = self.factory.create(&self.address).await?;

        let response = match channel.connect(ConnectionRequest { token: candidate }).await {
            Ok(response) => response,
            Err(error) => {
                channel.close().await;
                return Err(error);
            }
        };

        match (response.established, response.token) {
            (true, Some(token)) => Ok((Arc::new(channel), token)),
            (true, None) => {
                channel.close().await;
                Err(IpcError::protocol(
                    "Handshake accepted without a session token",
                ))
            }
            (false, _) => {
                channel.close().await;
                Err(IpcError::handshake(format!(
                    "{} rejected the connection",
                    self.address
                )))
            }
        }
    }

    /// End the session. Idempotent.
    ///
    /// While Connected, a best-effort DisconnectionMessage goes out first. Returns
    /// `true` if the peer confirmed the termination or there was no live session.
    pub async fn disconnect(&self) -> bool {
        let (previous, token, channel) = {
            let mut bound = self.bound.write().await;
            let token = bound.session.token();
            let previous = bound.session.end();
            (previous, token, bound.channel.take())
        };

        if previous == SessionState::Disconnected && channel.is_none() {
            debug!("Disconnect from {}: already disconnected", self.address);
            return true;
        }

        let mut clean = true;

        if let Some(channel) = channel {
            if let Some(token) = token {
                clean = self.farewell(&channel, token).await;
            }
            close_contained(&*channel, &self.address).await;
        }

        info!("Disconnected from {}", self.address);
        self.events.publish(ConnectionEvent::Disconnected);
        clean
    }

    async fn farewell(&self, channel: &F::Channel, token: SessionToken) -> bool {
        let outcome = self
            .bounded(
                "disconnect",
                self.timeouts.send,
                contained(channel.disconnect(DisconnectionMessage { token })),
            )
            .await;

        match outcome {
            Ok(response) if response.connection_terminated => true,
            Ok(_) => {
                warn!("{} did not confirm session termination", self.address);
                false
            }
            Err(error) => {
                let fault = CommunicationFault::from(error);
                warn!(
                    "DisconnectionMessage to {} failed [{}]: {}",
                    self.address,
                    fault.category(),
                    fault
                );
                false
            }
        }
    }

    /// Send `message` on the live session and wait for the answer.
    ///
    /// Errors with [`IpcError::NotConnected`] outside the Connected state. When the
    /// exchange fails and the channel reports itself Closed or Faulted, the session
    /// becomes Faulted and [`ConnectionEvent::ConnectionLost`] is published.
    pub(crate) async fn send(&self, message: Message) -> Result<Option<Response>, IpcError> {
        let (channel, token) = {
            let bound = self.bound.read().await;
            match (bound.session.token(), &bound.channel) {
                (Some(token), Some(channel)) => (Arc::clone(channel), token),
                _ => {
                    return Err(IpcError::not_connected(format!(
                        "Cannot send {} while {:?}",
                        message.kind(),
                        bound.session.state()
                    )));
                }
            }
        };

        let kind = message.kind();
        debug!("Sending {} to {}", kind, self.address);

        let result = self
            .bounded(
                kind,
                self.timeouts.send,
                contained(channel.send(token, message)),
            )
            .await;

        if result.is_err() && channel.state() != ChannelState::Opened {
            self.lose(Some(&channel)).await;
        }

        result
    }

    /// Treat the live session as lost, whatever the channel reports.
    pub(crate) async fn mark_lost(&self) {
        self.lose(None).await;
    }

    /// Connected -> Faulted. With `expected`, only if that channel is still the
    /// session's channel.
    async fn lose(&self, expected: Option<&Arc<F::Channel>>) {
        let channel = {
            let mut bound = self.bound.write().await;
            let current = match (expected, &bound.channel) {
                (Some(expected), Some(current)) => Arc::ptr_eq(expected, current),
                (Some(_), None) => false,
                (None, _) => true,
            };
            if !current || !bound.session.fault() {
                return;
            }
            bound.channel.take()
        };

        warn!("Connection to {} lost", self.address);
        self.events.publish(ConnectionEvent::ConnectionLost);

        if let Some(channel) = channel {
            close_contained(&*channel, &self.address).await;
        }
    }

    /// Ping the peer every `interval` while Connected. The session is marked lost on
    /// the first unanswered ping. Intervals below
    /// [`MIN_HEARTBEAT_MS`](crate::config::MIN_HEARTBEAT_MS) are raised to it.
    pub fn start_heartbeat(self: &Arc<Self>, interval: Duration) -> HeartbeatHandle {
        heartbeat::spawn(Arc::clone(self), interval)
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        limit: Duration,
        future: impl Future<Output = Result<T, IpcError>>,
    ) -> Result<T, IpcError> {
        match timeout(limit, future).await {
            Ok(result) => result,
            Err(_) => Err(IpcError::timeout(
                format!("{operation} to {}", self.address),
                u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }
}

/// Run a channel future, turning a panic inside it into [`IpcError::ChannelPanicked`].
async fn contained<T>(future: impl Future<Output = Result<T, IpcError>>) -> Result<T, IpcError> {
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(IpcError::channel_panicked(panic.as_ref())))
}

async fn close_contained<C: Channel>(channel: &C, address: &str) {
    if let Err(panic) = AssertUnwindSafe(channel.close()).catch_unwind().await {
        warn!(
            "Closing channel to {} panicked: {}",
            address,
            IpcError::channel_panicked(panic.as_ref())
        );
    }
}
