use crate::config::ProxyConfig;
use crate::connection::ConnectionEvent;
use crate::data::{
    Message, PasswordReplyMessage, ReconfigurationMessage, Response, SessionToken,
    SimpleMessagePurport, SimpleResponsePurport,
};
use crate::proxy::ServiceProxy;
use crate::tests::support::{
    Handshake, MockFactory, MockPeer, Reply, TEST_ADDRESS, short_timeouts,
};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use uuid::Uuid;

async fn connected_proxy(peer: &Arc<MockPeer>) -> ServiceProxy<MockFactory> {
    let proxy = ServiceProxy::new(TEST_ADDRESS, MockFactory::new(peer), short_timeouts());
    assert!(proxy.connect(SessionToken::generate()).await);
    proxy
}

#[tokio::test]
async fn given_acknowledging_peer_when_calling_each_operation_then_each_succeeds() {
    // GIVEN: An acknowledging peer
    let peer = MockPeer::acknowledging();
    let proxy = connected_proxy(&peer).await;
    let request_id = Uuid::new_v4();

    // WHEN: Calling every operation
    let ready = proxy.inform_client_ready().await;
    let shutdown = proxy.request_shutdown().await;
    let password = proxy.submit_password(request_id, true, "s3cret").await;
    let reconfiguration = proxy
        .request_reconfiguration("/tmp/exam.seb", "https://exam.example.org/start")
        .await;

    // THEN: All succeed, messages as given
    assert!(ready.success());
    assert!(shutdown.success());
    assert!(password.success());
    assert!(reconfiguration.success());
    assert_eq!(
        peer.sent_messages(),
        vec![
            Message::from(SimpleMessagePurport::ClientIsReady),
            Message::from(SimpleMessagePurport::RequestShutdown),
            Message::from(PasswordReplyMessage {
                request_id,
                success: true,
                password: "s3cret".into(),
            }),
            Message::from(ReconfigurationMessage {
                configuration_path: "/tmp/exam.seb".to_string(),
                resource_url: "https://exam.example.org/start".to_string(),
            }),
        ]
    );
}

/// **VALUE**: Verifies that the service façade applies the same failure contract.
///
/// **BUG THIS CATCHES**: Would catch the service side accepting `UnknownMessage` as
/// an acknowledgement.
#[tokio::test]
async fn given_unknown_message_response_when_calling_then_failure() {
    // GIVEN: A peer that does not understand anything
    let peer = MockPeer::new(
        Handshake::Accept(SessionToken::generate()),
        Reply::Respond(Response::simple(SimpleResponsePurport::UnknownMessage)),
    );
    let proxy = connected_proxy(&peer).await;

    // THEN: Failures
    assert!(!proxy.inform_client_ready().await.success());
    assert!(!proxy.request_shutdown().await.success());
}

/// **VALUE**: Verifies that the configured heartbeat starts on connect.
///
/// **BUG THIS CATCHES**: Would catch `with_config` dropping the heartbeat section.
#[tokio::test]
async fn given_heartbeat_configured_when_peer_dies_then_connection_lost_published() {
    // GIVEN: A proxy configured with a fast heartbeat
    let mut config = ProxyConfig {
        address: TEST_ADDRESS.to_string(),
        connect_timeout_ms: 200,
        send_timeout_ms: 200,
        ..ProxyConfig::default()
    };
    config.heartbeat.enabled = true;
    config.heartbeat.interval_ms = 100;

    let peer = MockPeer::acknowledging();
    let proxy = ServiceProxy::with_config(&config, MockFactory::new(&peer));
    let mut events = proxy.subscribe();
    assert!(proxy.connect(SessionToken::generate()).await);
    assert!(matches!(
        events.recv().await,
        Ok(ConnectionEvent::Connected { .. })
    ));

    // WHEN: The peer's channel dies
    peer.set_reply(Reply::Drop);

    // THEN: The heartbeat notices
    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within deadline")
        .expect("queue open");
    assert_eq!(event, ConnectionEvent::ConnectionLost);
    assert!(!proxy.is_connected().await);
}

#[tokio::test]
async fn given_connected_when_disconnect_then_session_token_cleared() {
    let peer = MockPeer::acknowledging();
    let proxy = connected_proxy(&peer).await;
    assert!(proxy.session_token().await.is_some());

    assert!(proxy.disconnect().await);

    assert!(proxy.session_token().await.is_none());
    assert!(!proxy.inform_client_ready().await.success());
}
