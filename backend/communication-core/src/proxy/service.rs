//! Façade for the side that reports readiness, answers password prompts and asks
//! for shutdown or reconfiguration.

use crate::channel::{ChannelFactory, WebSocketChannelFactory};
use crate::config::ProxyConfig;
use crate::connection::{ConnectionEvent, Timeouts};
use crate::data::{
    CommunicationResult, Message, PasswordReplyMessage, ReconfigurationMessage, SessionToken,
    SimpleMessagePurport,
};
use crate::proxy::failsafe::ACKNOWLEDGED;
use crate::proxy::link::ProxyLink;

use common::RedactedSecret;

use std::time::Duration;

use tokio::sync::broadcast;
use uuid::Uuid;

/// Service-side façade. Same contract as [`ClientProxy`](crate::proxy::ClientProxy):
/// every operation succeeds only on `SimpleResponse(Acknowledged)`.
pub struct ServiceProxy<F: ChannelFactory = WebSocketChannelFactory> {
    link: ProxyLink<F>,
}

impl ServiceProxy<WebSocketChannelFactory> {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::with_config(config, WebSocketChannelFactory)
    }
}

impl<F: ChannelFactory> ServiceProxy<F> {
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

    pub async fn inform_client_ready(&self) -> CommunicationResult {
        self.link
            .execute(
                "InformClientReady",
                Message::from(SimpleMessagePurport::ClientIsReady),
                ACKNOWLEDGED,
            )
            .await
    }

    pub async fn request_shutdown(&self) -> CommunicationResult {
        self.link
            .execute(
                "RequestShutdown",
                Message::from(SimpleMessagePurport::RequestShutdown),
                ACKNOWLEDGED,
            )
            .await
    }

    /// Answer an earlier password request. The password is never logged.
    pub async fn submit_password(
        &self,
        request_id: Uuid,
        success: bool,
        password: impl Into<RedactedSecret>,
    ) -> CommunicationResult {
        self.link
            .execute(
                "SubmitPassword",
                Message::from(PasswordReplyMessage {
                    request_id,
                    success,
                    password: password.into(),
                }),
                ACKNOWLEDGED,
            )
            .await
    }

    pub async fn request_reconfiguration(
        &self,
        configuration_path: impl Into<String>,
        resource_url: impl Into<String>,
    ) -> CommunicationResult {
        self.link
            .execute(
                "RequestReconfiguration",
                Message::from(ReconfigurationMessage {
                    configuration_path: configuration_path.into(),
                    resource_url: resource_url.into(),
                }),
                ACKNOWLEDGED,
            )
            .await
    }
}
