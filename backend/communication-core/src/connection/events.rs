//! Connection lifecycle notifications.

use crate::data::SessionToken;

use log::debug;
use tokio::sync::broadcast;

const EVENT_QUEUE_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConnectionEvent {
    /// Handshake accepted; `token` is the one the peer issued.
    Connected { token: SessionToken },
    /// Session ended by a local `disconnect`.
    Disconnected,
    /// Channel closed or faulted under a live session.
    ConnectionLost,
}

/// Typed multi-subscriber queue of [`ConnectionEvent`]s.
///
/// Subscribers that fall more than the queue capacity behind observe
/// `RecvError::Lagged` and skip ahead.
#[derive(Debug)]
pub(crate) struct EventQueue {
    sender: broadcast::Sender<ConnectionEvent>,
}

impl EventQueue {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_QUEUE_CAPACITY);
        Self { sender }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.sender.subscribe()
    }

    pub(crate) fn publish(&self, event: ConnectionEvent) {
        // No subscribers is fine.
        if self.sender.send(event).is_err() {
            debug!("No subscribers for {:?}", event);
        }
    }
}
