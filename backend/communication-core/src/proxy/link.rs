//! Connection plumbing shared by both proxy façades.

use crate::channel::ChannelFactory;
use crate::connection::{
    ConnectionEvent, ConnectionManager, HeartbeatHandle, SessionState, Timeouts,
};
use crate::data::{CommunicationResult, Message, SessionToken, SimpleMessagePurport};
use crate::proxy::failsafe::{self, ACKNOWLEDGED, Expectation};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};

pub struct ProxyLink<F: ChannelFactory> {
    manager: Arc<ConnectionManager<F>>,
    heartbeat_interval: Option<Duration>,
    heartbeat: Mutex<Option<HeartbeatHandle>>,
}

impl<F: ChannelFactory> ProxyLink<F> {
    pub(crate) fn new(
        address: impl Into<String>,
        factory: F,
        timeouts: Timeouts,
        heartbeat_interval: Option<Duration>,
    ) -> Self {
        Self {
            manager: Arc::new(ConnectionManager::new(address, factory, timeouts)),
            heartbeat_interval,
            heartbeat: Mutex::new(None),
        }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager<F>> {
        &self.manager
    }

    /// Handshake, then start the configured heartbeat.
    pub async fn connect(&self, candidate: SessionToken) -> bool {
        if !self.manager.connect(candidate).await {
            return false;
        }
        if let Some(period) = self.heartbeat_interval {
            self.start_heartbeat(period).await;
        }
        true
    }

    pub async fn disconnect(&self) -> bool {
        if let Some(heartbeat) = self.heartbeat.lock().await.take() {
            heartbeat.stop();
        }
        self.manager.disconnect().await
    }

    /// Replaces any running heartbeat.
    pub async fn start_heartbeat(&self, period: Duration) {
        let handle = self.manager.start_heartbeat(period);
        if let Some(previous) = self.heartbeat.lock().await.replace(handle) {
            previous.stop();
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.manager.is_connected().await
    }

    pub async fn state(&self) -> SessionState {
        self.manager.state().await
    }

    pub async fn session_token(&self) -> Option<SessionToken> {
        self.manager.session_token().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.manager.subscribe()
    }

    pub async fn ping(&self) -> CommunicationResult {
        self.execute(
            "Ping",
            Message::from(SimpleMessagePurport::Ping),
            ACKNOWLEDGED,
        )
        .await
    }

    pub(crate) async fn execute<T>(
        &self,
        operation: &str,
        message: Message,
        expectation: Expectation<T>,
    ) -> CommunicationResult<T> {
        failsafe::execute(operation, expectation, self.manager.send(message)).await
    }
}
