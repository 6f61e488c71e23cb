use crate::helpers::{TEST_PROCESS_ID, client_proxy, start_test_host};

use communication_core::connection::{ConnectionEvent, SessionState};
use communication_core::data::{Message, PasswordRequestPurpose, SessionToken, SimpleMessagePurport};

use std::time::Duration;

use tokio::time::{sleep, timeout};
use uuid::Uuid;

/// **VALUE**: Verifies the full handshake over a real loopback socket.
///
/// **WHY THIS MATTERS**: This is the path every client takes at startup. The host must
/// issue its own token and the proxy must adopt it, or every later request is refused.
///
/// **BUG THIS CATCHES**: Would catch:
/// - Request/response correlation broken between channel and host
/// - Proxy keeping its candidate token
/// - Handler not receiving typed messages
#[tokio::test]
async fn given_host_running_when_proxy_connects_then_host_issued_token_used() {
    // GIVEN: A host and a proxy
    let (handle, handler) = start_test_host(None).await;
    let proxy = client_proxy(&handle);
    let candidate = SessionToken::generate();

    // WHEN: Connecting and sending
    let connected = proxy.connect(candidate).await;
    let shutdown = proxy.initiate_shutdown().await;

    // THEN: Connected with a different, host-issued token; message delivered
    assert!(connected);
    let issued = proxy.session_token().await.expect("session token");
    assert_ne!(issued, candidate);
    assert!(shutdown.success());
    assert_eq!(
        handler.received(),
        vec![Message::from(SimpleMessagePurport::Shutdown)]
    );
}

#[tokio::test]
async fn given_host_running_when_request_authentication_then_process_id_returned() {
    // GIVEN: A connected proxy
    let (handle, _handler) = start_test_host(None).await;
    let proxy = client_proxy(&handle);
    assert!(proxy.connect(SessionToken::generate()).await);

    // WHEN: Requesting authentication
    let result = proxy.request_authentication().await;

    // THEN: The handler's process id
    assert!(result.success());
    assert_eq!(result.value().map(|r| r.process_id), Some(TEST_PROCESS_ID));
}

/// **VALUE**: Verifies that the startup token gates the handshake.
///
/// **WHY THIS MATTERS**: The startup token is how the service knows it is talking to
/// the client it launched and not some other local process.
///
/// **BUG THIS CATCHES**: Would catch the host ignoring the configured startup token.
#[tokio::test]
async fn given_startup_token_when_wrong_token_offered_then_rejected() {
    // GIVEN: A host expecting a startup token
    let startup = Uuid::new_v4();
    let (handle, _handler) = start_test_host(Some(startup)).await;

    // WHEN: Connecting with a different token
    let stranger = client_proxy(&handle);
    let rejected = stranger.connect(SessionToken::generate()).await;

    // THEN: Rejected, Disconnected (not Faulted)
    assert!(!rejected);
    assert_eq!(stranger.link().state().await, SessionState::Disconnected);

    // WHEN: Connecting with the startup token
    let client = client_proxy(&handle);
    let accepted = client.connect(SessionToken::from_uuid(startup)).await;

    // THEN: Accepted
    assert!(accepted);
}

/// **VALUE**: Verifies single-session enforcement and release on disconnect.
///
/// **BUG THIS CATCHES**: Would catch a second client hijacking the service while the
/// first is connected, or the slot never being released.
#[tokio::test]
async fn given_active_session_when_second_proxy_connects_then_rejected_until_first_leaves() {
    // GIVEN: A connected first proxy
    let (handle, _handler) = start_test_host(None).await;
    let first = client_proxy(&handle);
    assert!(first.connect(SessionToken::generate()).await);

    // WHEN: A second proxy connects
    let second = client_proxy(&handle);
    let refused = second.connect(SessionToken::generate()).await;

    // THEN: Refused
    assert!(!refused);

    // WHEN: The first disconnects and the second retries
    assert!(first.disconnect().await);
    let accepted = second.connect(SessionToken::generate()).await;

    // THEN: Accepted
    assert!(accepted);
}

/// **VALUE**: Verifies that concurrent requests on one channel are all answered.
///
/// **WHY THIS MATTERS**: An authentication check and a shutdown notice can overlap.
/// Responses must find their own caller even when they arrive interleaved.
///
/// **BUG THIS CATCHES**: Would catch responses being routed by arrival order instead of
/// by request id, or writes interleaving inside a frame.
#[tokio::test]
async fn given_connected_when_auth_and_shutdown_concurrent_then_both_succeed() {
    // GIVEN: A connected proxy
    let (handle, _handler) = start_test_host(None).await;
    let proxy = client_proxy(&handle);
    assert!(proxy.connect(SessionToken::generate()).await);

    // WHEN: Authentication, shutdown and a password request run concurrently
    let (authentication, shutdown, password) = tokio::join!(
        proxy.request_authentication(),
        proxy.initiate_shutdown(),
        proxy.request_password(PasswordRequestPurpose::LocalAdministrator, Uuid::new_v4()),
    );

    // THEN: All succeed with the right kinds
    assert!(authentication.success());
    assert_eq!(
        authentication.value().map(|r| r.process_id),
        Some(TEST_PROCESS_ID)
    );
    assert!(shutdown.success());
    assert!(password.success());
}

/// **VALUE**: Verifies that a handler with nothing to say produces a failure.
///
/// **BUG THIS CATCHES**: Would catch the host dropping the request without answering,
/// which leaves the proxy waiting for the full send timeout.
#[tokio::test]
async fn given_handler_returns_nothing_when_calling_then_failure_quickly() {
    // GIVEN: A connected proxy (the test handler ignores reconfiguration denials)
    let (handle, _handler) = start_test_host(None).await;
    let proxy = client_proxy(&handle);
    assert!(proxy.connect(SessionToken::generate()).await);

    // WHEN: Informing about a denied reconfiguration
    let result = timeout(
        Duration::from_secs(1),
        proxy.inform_reconfiguration_denied("exam running"),
    )
    .await
    .expect("answered before the send timeout");

    // THEN: Failure
    assert!(!result.success());
}

/// **VALUE**: Verifies that a dead host is detected and reported.
///
/// **WHY THIS MATTERS**: When the service crashes, the client must stop reporting itself
/// connected and tell its subscribers so they can reconnect or alert the proctor.
///
/// **BUG THIS CATCHES**: Would catch:
/// - Sends on a dead socket hanging instead of failing
/// - `ConnectionLost` never being published
/// - The session staying Connected after the socket died
#[tokio::test]
async fn given_host_killed_when_sending_then_failure_and_connection_lost() {
    // GIVEN: A connected proxy with a subscriber
    let (handle, _handler) = start_test_host(None).await;
    let proxy = client_proxy(&handle);
    let mut events = proxy.subscribe();
    assert!(proxy.connect(SessionToken::generate()).await);
    assert!(matches!(
        events.recv().await,
        Ok(ConnectionEvent::Connected { .. })
    ));

    // WHEN: The host goes away
    handle.shutdown();
    sleep(Duration::from_millis(200)).await;

    // THEN: Sends fail
    assert!(!proxy.initiate_shutdown().await.success());
    assert!(!proxy.request_authentication().await.success());

    // THEN: ConnectionLost published, session Faulted
    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within deadline")
        .expect("queue open");
    assert_eq!(event, ConnectionEvent::ConnectionLost);
    assert_eq!(proxy.link().state().await, SessionState::Faulted);
}

#[tokio::test]
async fn given_connected_when_disconnect_then_clean_and_idempotent() {
    // GIVEN: A connected proxy
    let (handle, _handler) = start_test_host(None).await;
    let proxy = client_proxy(&handle);
    assert!(proxy.connect(SessionToken::generate()).await);

    // WHEN: Disconnecting twice
    let first = proxy.disconnect().await;
    let second = proxy.disconnect().await;

    // THEN: Both clean, no longer connected
    assert!(first);
    assert!(second);
    assert!(!proxy.is_connected().await);
}

#[tokio::test]
async fn given_nothing_listening_when_connect_then_false_and_faulted() {
    // GIVEN: A host that was started and stopped, so its port is free
    let (handle, _handler) = start_test_host(None).await;
    let proxy = client_proxy(&handle);
    drop(handle);
    sleep(Duration::from_millis(100)).await;

    // WHEN: Connecting
    let connected = proxy.connect(SessionToken::generate()).await;

    // THEN: Faulted
    assert!(!connected);
    assert_eq!(proxy.link().state().await, SessionState::Faulted);
}
