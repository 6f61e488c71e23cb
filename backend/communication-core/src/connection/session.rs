//! Session state machine.

use crate::data::SessionToken;

/// Lifecycle of the single session a connection manager owns.
///
/// ```text
/// Disconnected ──connect──> Connecting ──accepted──> Connected
///      ^                        │                       │
///      │<──────rejected─────────┘                       ├──disconnect──> Disconnected
///      │                        │                       └──lost────────> Faulted
///      │                        └──transport fault──> Faulted
///      └───────────────────────────────────────────────────────────────────┘ (reconnect)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// Handshake outstanding.
    Connecting,
    Connected,
    /// Transport error or peer-closed channel.
    Faulted,
}

impl SessionState {
    /// States from which a new handshake may start.
    pub fn can_connect(self) -> bool {
        matches!(self, SessionState::Disconnected | SessionState::Faulted)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Session {
    state: SessionState,
    token: Option<SessionToken>,
    attempt: u64,
}

impl Session {
    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    /// Token of the established session. `None` unless Connected.
    pub(crate) fn token(&self) -> Option<SessionToken> {
        match self.state {
            SessionState::Connected => self.token,
            _ => None,
        }
    }

    /// Returns `false` and leaves the session alone if a handshake is already
    /// outstanding or a session is live.
    pub(crate) fn begin_handshake(&mut self) -> bool {
        if !self.state.can_connect() {
            return false;
        }
        self.state = SessionState::Connecting;
        self.token = None;
        self.attempt = self.attempt.wrapping_add(1);
        true
    }

    /// Counter bumped by every successful [`begin_handshake`](Self::begin_handshake).
    pub(crate) fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Complete the handshake with the token the peer issued.
    ///
    /// Returns `false` if the handshake was abandoned (disconnect raced it).
    pub(crate) fn establish(&mut self, token: SessionToken) -> bool {
        if self.state != SessionState::Connecting {
            return false;
        }
        self.state = SessionState::Connected;
        self.token = Some(token);
        true
    }

    pub(crate) fn abort_handshake(&mut self, faulted: bool) {
        if self.state == SessionState::Connecting {
            self.state = if faulted {
                SessionState::Faulted
            } else {
                SessionState::Disconnected
            };
            self.token = None;
        }
    }

    /// Mark a live session as lost. Returns `true` on the Connected -> Faulted edge only.
    pub(crate) fn fault(&mut self) -> bool {
        if self.state != SessionState::Connected {
            return false;
        }
        self.state = SessionState::Faulted;
        self.token = None;
        true
    }

    /// Returns the previous state.
    pub(crate) fn end(&mut self) -> SessionState {
        let previous = self.state;
        self.state = SessionState::Disconnected;
        self.token = None;
        previous
    }
}
