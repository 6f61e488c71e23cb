//! End-to-end: the real client proxy against the running service.

use lockdown_service::handler::ServiceRequestHandler;
use lockdown_service::service::{RunningService, start_with_handler};

use communication_core::config::LinkConfig;
use communication_core::connection::Timeouts;
use communication_core::data::{PasswordRequestPurpose, SessionToken};
use communication_core::proxy::{ClientProxy, ServiceProxy};

use std::time::Duration;

use tokio::time::timeout;
use uuid::Uuid;

const TEST_PROCESS_ID: u32 = 4711;

async fn start_test_service(startup_token: Option<Uuid>) -> RunningService {
    let mut config = LinkConfig::default();
    config.host.port = 0;
    config.host.startup_token = startup_token;

    start_with_handler(&config, ServiceRequestHandler::with_process_id(TEST_PROCESS_ID))
        .await
        .expect("Failed to start service")
}

fn timeouts() -> Timeouts {
    Timeouts {
        connect: Duration::from_secs(2),
        send: Duration::from_secs(2),
    }
}

/// **VALUE**: Verifies the exam client's startup sequence against the real service.
///
/// **WHY THIS MATTERS**: The client launches the service with a startup token, connects,
/// checks it is talking to the right process and reports ready. If any step fails the
/// exam cannot start.
///
/// **BUG THIS CATCHES**: Would catch:
/// - The service not honouring its configured startup token
/// - Authentication not returning the service's process id
/// - `ClientIsReady` not reaching the handler
#[tokio::test]
async fn given_running_service_when_client_starts_up_then_authenticated_and_ready() {
    // GIVEN: A service expecting a startup token
    let startup = Uuid::new_v4();
    let service = start_test_service(Some(startup)).await;
    let client = ClientProxy::new(
        service.address(),
        communication_core::channel::WebSocketChannelFactory,
        timeouts(),
    );

    // WHEN: Connecting with the startup token and authenticating
    assert!(client.connect(SessionToken::from_uuid(startup)).await);
    let authentication = client.request_authentication().await;

    // THEN: The service identifies itself
    assert!(authentication.success());
    assert_eq!(
        authentication.value().map(|r| r.process_id),
        Some(TEST_PROCESS_ID)
    );

    // WHEN: The service-side façade reports ready on a second session
    assert!(client.disconnect().await);
    let proxy = ServiceProxy::new(
        service.address(),
        communication_core::channel::WebSocketChannelFactory,
        timeouts(),
    );
    assert!(proxy.connect(SessionToken::from_uuid(startup)).await);
    let ready = proxy.inform_client_ready().await;

    // THEN: Recorded by the handler
    assert!(ready.success());
    assert!(service.handler().is_client_ready());
}

#[tokio::test]
async fn given_password_submitted_when_handled_then_service_can_take_it() {
    // GIVEN: A connected service proxy
    let service = start_test_service(None).await;
    let proxy = ServiceProxy::new(
        service.address(),
        communication_core::channel::WebSocketChannelFactory,
        timeouts(),
    );
    assert!(proxy.connect(SessionToken::generate()).await);
    let request_id = Uuid::new_v4();

    // WHEN: Submitting a password
    let result = proxy.submit_password(request_id, true, "proctor-secret").await;

    // THEN: Acknowledged and stored
    assert!(result.success());
    let reply = service
        .handler()
        .take_password_reply(request_id)
        .expect("stored reply");
    assert!(reply.success);
    assert_eq!(reply.password.expose(), "proctor-secret");
}

/// **VALUE**: Verifies that a client shutdown request reaches the binary's wait.
///
/// **BUG THIS CATCHES**: Would catch the service acknowledging a shutdown and then
/// keeping the host open forever.
#[tokio::test]
async fn given_client_requests_shutdown_when_waiting_then_wait_resolves() {
    // GIVEN: A connected service-side proxy
    let service = start_test_service(None).await;
    let proxy = ServiceProxy::new(
        service.address(),
        communication_core::channel::WebSocketChannelFactory,
        timeouts(),
    );
    assert!(proxy.connect(SessionToken::generate()).await);

    // WHEN: Requesting shutdown
    assert!(proxy.request_shutdown().await.success());

    // THEN: The wait resolves and the host can be stopped
    timeout(Duration::from_secs(2), service.wait_for_shutdown())
        .await
        .expect("shutdown signalled");
    service.shutdown();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!service.is_running());
}

#[tokio::test]
async fn given_client_directed_message_when_sent_to_service_then_failure() {
    // GIVEN: A connected client
    let service = start_test_service(None).await;
    let client = ClientProxy::new(
        service.address(),
        communication_core::channel::WebSocketChannelFactory,
        timeouts(),
    );
    assert!(client.connect(SessionToken::generate()).await);

    // WHEN: Sending client-directed messages to the service
    let password = client
        .request_password(PasswordRequestPurpose::LocalSettings, Uuid::new_v4())
        .await;
    let shutdown = client.initiate_shutdown().await;

    // THEN: UnknownMessage folds into failure, the service keeps running
    assert!(!password.success());
    assert!(!shutdown.success());
    assert!(!*service.handler().shutdown_requested().borrow());
}
