//! Per-connection session tracking.
//!
//! The host serves at most one session at a time across all connections. The
//! [`SessionSlot`] is that shared claim; each connection's [`ConnectionState`]
//! holds it while its session is live and gives it back when the session ends or
//! the connection goes away.

use crate::data::SessionToken;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub(crate) struct SessionSlot {
    active: Arc<Mutex<Option<SessionToken>>>,
}

impl SessionSlot {
    /// Issue a fresh token if no session is active.
    fn claim(&self) -> Option<SessionToken> {
        let mut active = self.lock();
        if active.is_some() {
            return None;
        }
        let token = SessionToken::generate();
        *active = Some(token);
        Some(token)
    }

    fn release(&self, token: SessionToken) {
        let mut active = self.lock();
        if *active == Some(token) {
            *active = None;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<SessionToken>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) struct ConnectionState {
    startup_token: Option<SessionToken>,
    slot: SessionSlot,
    session: Option<SessionToken>,
}

impl ConnectionState {
    pub(crate) fn new(startup_token: Option<SessionToken>, slot: SessionSlot) -> Self {
        Self {
            startup_token,
            slot,
            session: None,
        }
    }

    /// Accept a handshake offering `offered`.
    ///
    /// Returns the issued session token, or `None` if the startup token does not
    /// match, this connection already has a session, or another one is active.
    pub(crate) fn open_session(&mut self, offered: SessionToken) -> Option<SessionToken> {
        if self.session.is_some() {
            return None;
        }
        if self.startup_token.is_some_and(|expected| expected != offered) {
            return None;
        }
        let token = self.slot.claim()?;
        self.session = Some(token);
        Some(token)
    }

    /// Whether `token` (as sent on the wire) is this connection's session token.
    pub(crate) fn is_authorized(&self, token: &str) -> bool {
        match self.session {
            Some(session) => token.parse::<SessionToken>().is_ok_and(|t| t == session),
            None => false,
        }
    }

    pub(crate) fn close_session(&mut self) {
        if let Some(token) = self.session.take() {
            self.slot.release(token);
        }
    }
}

impl Drop for ConnectionState {
    fn drop(&mut self) {
        self.close_session();
    }
}
