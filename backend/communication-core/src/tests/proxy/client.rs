use crate::data::{
    AuthenticationResponse, Message, PasswordRequestMessage, PasswordRequestPurpose, Response,
    SessionToken, SimpleMessagePurport, SimpleResponsePurport,
};
use crate::proxy::ClientProxy;
use crate::tests::support::{
    Handshake, MockFactory, MockPeer, Reply, TEST_ADDRESS, short_timeouts,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

async fn connected_proxy(peer: &Arc<MockPeer>) -> ClientProxy<MockFactory> {
    let proxy = ClientProxy::new(TEST_ADDRESS, MockFactory::new(peer), short_timeouts());
    assert!(proxy.connect(SessionToken::generate()).await);
    proxy
}

/// **VALUE**: Verifies the basic shutdown round trip.
///
/// **BUG THIS CATCHES**: Would catch the wrong purport being sent or the
/// acknowledgement not being recognized.
#[tokio::test]
async fn given_peer_acknowledges_when_initiate_shutdown_then_success() {
    // GIVEN: A connected proxy and an acknowledging peer
    let peer = MockPeer::acknowledging();
    let proxy = connected_proxy(&peer).await;

    // WHEN: Initiating shutdown
    let result = proxy.initiate_shutdown().await;

    // THEN: Success, and a Shutdown message went out
    assert!(result.success());
    assert_eq!(
        peer.sent_messages(),
        vec![Message::from(SimpleMessagePurport::Shutdown)]
    );
}

/// **VALUE**: Verifies that an explicit null response is a failure.
///
/// **WHY THIS MATTERS**: The host answers with an empty envelope when it has nothing to
/// say. Treating that as success would report an authenticated service that never
/// identified itself.
///
/// **BUG THIS CATCHES**: Would catch `Ok(None)` being mapped to a default value.
#[tokio::test]
async fn given_peer_returns_nothing_when_request_authentication_then_failure() {
    // GIVEN: A peer that answers with no payload
    let peer = MockPeer::new(Handshake::Accept(SessionToken::generate()), Reply::Nothing);
    let proxy = connected_proxy(&peer).await;

    // WHEN: Requesting authentication
    let result = proxy.request_authentication().await;

    // THEN: Failure with the default value
    assert!(!result.success());
    assert!(result.value().is_none());
    assert_eq!(
        result.into_value().unwrap_or_default(),
        AuthenticationResponse::default()
    );
}

#[tokio::test]
async fn given_peer_authenticates_when_request_authentication_then_value_returned() {
    // GIVEN: A peer that identifies itself
    let peer = MockPeer::new(
        Handshake::Accept(SessionToken::generate()),
        Reply::Respond(Response::from(AuthenticationResponse { process_id: 4242 })),
    );
    let proxy = connected_proxy(&peer).await;

    // WHEN: Requesting authentication
    let result = proxy.request_authentication().await;

    // THEN: Success carrying the response
    assert!(result.success());
    assert_eq!(result.value().map(|r| r.process_id), Some(4242));
}

/// **VALUE**: Verifies that a failing peer never raises to the caller.
///
/// **WHY THIS MATTERS**: The whole point of the façade is that UI code can call it
/// without guarding. Any error escaping here crashes the caller.
///
/// **BUG THIS CATCHES**: Would catch an operation propagating the send error instead of
/// folding it into the result.
#[tokio::test]
async fn given_peer_fails_every_send_when_calling_each_operation_then_each_fails_quietly() {
    // GIVEN: A peer that fails every send
    let peer = MockPeer::new(Handshake::Accept(SessionToken::generate()), Reply::Fail);
    let proxy = connected_proxy(&peer).await;

    // WHEN: Calling every operation
    let authentication = proxy.request_authentication().await;
    let password = proxy
        .request_password(PasswordRequestPurpose::Settings, Uuid::new_v4())
        .await;
    let denied = proxy.inform_reconfiguration_denied("exam in progress").await;
    let shutdown = proxy.initiate_shutdown().await;

    // THEN: Each independently fails
    assert!(!authentication.success());
    assert!(authentication.value().is_none());
    assert!(!password.success());
    assert!(!denied.success());
    assert!(!shutdown.success());
    assert_eq!(peer.sent().len(), 4);
}

/// **VALUE**: Verifies that the password request payload is passed through unchanged.
///
/// **BUG THIS CATCHES**: Would catch the façade substituting a default purpose or
/// generating its own request id.
#[tokio::test]
async fn given_acknowledging_peer_when_request_password_then_payload_unchanged() {
    // GIVEN: An acknowledging peer
    let peer = MockPeer::acknowledging();
    let proxy = connected_proxy(&peer).await;
    let request_id = Uuid::new_v4();

    // WHEN: Requesting the local settings password
    let result = proxy
        .request_password(PasswordRequestPurpose::LocalSettings, request_id)
        .await;

    // THEN: Success, payload as given
    assert!(result.success());
    assert_eq!(
        peer.sent_messages(),
        vec![Message::from(PasswordRequestMessage {
            purpose: PasswordRequestPurpose::LocalSettings,
            request_id,
        })]
    );
}

/// **VALUE**: Verifies that a response of the wrong kind is a failure.
///
/// **BUG THIS CATCHES**: Would catch "any response means success" leaking from
/// authentication into the acknowledged operations, and the reverse.
#[tokio::test]
async fn given_mismatched_response_kind_when_calling_then_failure() {
    // GIVEN: A peer that answers with an authentication response to everything
    let peer = MockPeer::new(
        Handshake::Accept(SessionToken::generate()),
        Reply::Respond(Response::from(AuthenticationResponse { process_id: 1 })),
    );
    let proxy = connected_proxy(&peer).await;

    // THEN: Acknowledged operations fail
    assert!(!proxy.initiate_shutdown().await.success());
    assert!(
        !proxy
            .inform_reconfiguration_denied("busy")
            .await
            .success()
    );

    // GIVEN: The peer acknowledges instead
    peer.set_reply(Reply::Respond(Response::acknowledged()));

    // THEN: Authentication fails
    assert!(!proxy.request_authentication().await.success());
}

#[tokio::test]
async fn given_negative_simple_response_when_calling_then_failure() {
    for purport in [
        SimpleResponsePurport::Rejected,
        SimpleResponsePurport::Unauthorized,
        SimpleResponsePurport::UnknownMessage,
    ] {
        let peer = MockPeer::new(
            Handshake::Accept(SessionToken::generate()),
            Reply::Respond(Response::simple(purport)),
        );
        let proxy = connected_proxy(&peer).await;

        assert!(!proxy.initiate_shutdown().await.success(), "{purport:?}");
    }
}

/// **VALUE**: Verifies that no operation succeeds before the handshake.
///
/// **BUG THIS CATCHES**: Would catch operations bypassing the session state check.
#[tokio::test]
async fn given_not_connected_when_calling_then_failure_without_sending() {
    // GIVEN: A proxy that never connected
    let peer = MockPeer::acknowledging();
    let proxy = ClientProxy::new(TEST_ADDRESS, MockFactory::new(&peer), short_timeouts());

    // WHEN: Calling operations
    let shutdown = proxy.initiate_shutdown().await;
    let authentication = proxy.request_authentication().await;

    // THEN: Failures, nothing sent
    assert!(!shutdown.success());
    assert!(!authentication.success());
    assert!(peer.sent().is_empty());
}

/// **VALUE**: Verifies that an unresponsive peer fails within the send timeout.
///
/// **WHY THIS MATTERS**: Callers await these operations. A hung service must not hang
/// the client.
#[tokio::test]
async fn given_peer_never_answers_when_calling_then_failure_within_timeout() {
    // GIVEN: A peer that never answers
    let peer = MockPeer::new(Handshake::Accept(SessionToken::generate()), Reply::Hang);
    let proxy = connected_proxy(&peer).await;

    // WHEN: Initiating shutdown
    let started = Instant::now();
    let result = proxy.initiate_shutdown().await;

    // THEN: Failure, bounded by the 200ms send timeout
    assert!(!result.success());
    assert!(started.elapsed() < Duration::from_secs(2));
}

/// **VALUE**: Verifies that a panicking channel is contained.
///
/// **BUG THIS CATCHES**: Would catch a missing unwind boundary, which would take the
/// caller's task down with the channel.
#[tokio::test]
async fn given_channel_panics_when_calling_then_failure() {
    // GIVEN: A channel that panics on send
    let peer = MockPeer::new(Handshake::Accept(SessionToken::generate()), Reply::Panic);
    let proxy = connected_proxy(&peer).await;

    // WHEN: Requesting authentication
    let result = proxy.request_authentication().await;

    // THEN: Plain failure
    assert!(!result.success());
}

/// **VALUE**: Verifies that concurrent operations do not block each other.
///
/// **WHY THIS MATTERS**: An authentication check and a shutdown notice can be in flight
/// at the same time. The façade must not serialize them itself.
#[tokio::test]
async fn given_concurrent_operations_when_awaited_together_then_both_succeed() {
    // GIVEN: An acknowledging peer
    let peer = MockPeer::acknowledging();
    let proxy = connected_proxy(&peer).await;

    // WHEN: Running two operations concurrently
    let (shutdown, password) = tokio::join!(
        proxy.initiate_shutdown(),
        proxy.request_password(PasswordRequestPurpose::LocalAdministrator, Uuid::new_v4()),
    );

    // THEN: Both succeed
    assert!(shutdown.success());
    assert!(password.success());
    assert_eq!(peer.sent().len(), 2);
}

#[tokio::test]
async fn given_connected_when_ping_then_success() {
    let peer = MockPeer::acknowledging();
    let proxy = connected_proxy(&peer).await;

    assert!(proxy.ping().await.success());
    assert_eq!(
        peer.sent_messages(),
        vec![Message::from(SimpleMessagePurport::Ping)]
    );
}
