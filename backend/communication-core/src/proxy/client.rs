//! Façade for the side that asks for authentication, passwords and shutdowns.

use crate::channel::{ChannelFactory, WebSocketChannelFactory};
use crate::config::ProxyConfig;
use crate::connection::{ConnectionEvent, Timeouts};
use crate::data::{
    AuthenticationResponse, CommunicationResult, Message, PasswordRequestMessage,
    PasswordRequestPurpose, ReconfigurationDeniedMessage, SessionToken, SimpleMessagePurport,
};
use crate::proxy::failsafe::{ACKNOWLEDGED, AUTHENTICATION};
use crate::proxy::link::ProxyLink;

use std::time::Duration;

use tokio::sync::broadcast;
use uuid::Uuid;

/// Client-side façade. Every operation waits for the answer or the send timeout
/// and never fails loudly; see [`CommunicationResult`].
pub struct ClientProxy<F: ChannelFactory = WebSocketChannelFactory> {
    link: ProxyLink<F>,
}

impl ClientProxy<WebSocketChannelFactory> {
    /// WebSocket proxy configured from `link.json`.
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::with_config(config, WebSocketChannelFactory)
    }
}

impl<F: ChannelFactory> ClientProxy<F> {
    pub fn new(address: impl Into<String>, factory: F, timeouts: Timeouts) -> Self {
        Self {
            link: ProxyLink::new(address, factory, timeouts, None),
        }
    }

    pub fn with_config(config: &ProxyConfig, factory: F) -> Self {
        Self {
            link: ProxyLink::new(
                config.address.clone(),
                factory,
                config.timeouts(),
                config.heartbeat_interval(),
            ),
        }
    }

    pub fn link(&self) -> &ProxyLink<F> {
        &self.link
    }

    pub async fn connect(&self, candidate: SessionToken) -> bool {
        self.link.connect(candidate).await
    }

    pub async fn disconnect(&self) -> bool {
        self.link.disconnect().await
    }

    pub async fn is_connected(&self) -> bool {
        self.link.is_connected().await
    }

    pub async fn session_token(&self) -> Option<SessionToken> {
        self.link.session_token().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.link.subscribe()
    }

    pub async fn ping(&self) -> CommunicationResult {
        self.link.ping().await
    }

    pub async fn start_heartbeat(&self, period: Duration) {
        self.link.start_heartbeat(period).await;
    }

    /// Tell the peer to shut down. Success iff Acknowledged.
    pub async fn initiate_shutdown(&self) -> CommunicationResult {
        self.link
            .execute(
                "InitiateShutdown",
                Message::from(SimpleMessagePurport::Shutdown),
                ACKNOWLEDGED,
            )
            .await
    }

    /// Success iff the peer answers with an authentication response of any content.
    pub async fn request_authentication(&self) -> CommunicationResult<AuthenticationResponse> {
        self.link
            .execute(
                "RequestAuthentication",
                Message::from(SimpleMessagePurport::Authenticate),
                AUTHENTICATION,
            )
            .await
    }

    /// Ask the peer to prompt for a password. The reply arrives later as a separate
    /// message carrying the same `request_id`.
    pub async fn request_password(
        &self,
        purpose: PasswordRequestPurpose,
        request_id: Uuid,
    ) -> CommunicationResult {
        self.link
            .execute(
                "RequestPassword",
                Message::from(PasswordRequestMessage {
                    purpose,
                    request_id,
                }),
                ACKNOWLEDGED,
            )
            .await
    }

    pub async fn inform_reconfiguration_denied(
        &self,
        reason: impl Into<String>,
    ) -> CommunicationResult {
        self.link
            .execute(
                "InformReconfigurationDenied",
                Message::from(ReconfigurationDeniedMessage {
                    reason: reason.into(),
                }),
                ACKNOWLEDGED,
            )
            .await
    }
}
