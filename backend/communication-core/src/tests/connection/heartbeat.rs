use crate::connection::{ConnectionEvent, ConnectionManager, SessionState};
use crate::data::{Message, SessionToken, SimpleMessagePurport};
use crate::tests::support::{MockFactory, MockPeer, Reply, TEST_ADDRESS, short_timeouts};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};

/// **VALUE**: Verifies that a silent peer is detected without any application traffic.
///
/// **WHY THIS MATTERS**: A proctoring client can sit idle for minutes. Without the
/// heartbeat, a dead service is only noticed on the next user action.
///
/// **BUG THIS CATCHES**: Would catch the heartbeat treating an empty answer as alive.
#[tokio::test]
async fn given_peer_stops_answering_when_heartbeat_runs_then_connection_lost() {
    // GIVEN: A live session with a heartbeat
    let peer = MockPeer::acknowledging();
    let manager = Arc::new(ConnectionManager::new(
        TEST_ADDRESS,
        MockFactory::new(&peer),
        short_timeouts(),
    ));
    assert!(manager.connect(SessionToken::generate()).await);
    let mut events = manager.subscribe();
    let heartbeat = manager.start_heartbeat(Duration::from_millis(100));

    // WHEN: The peer stops answering
    peer.set_reply(Reply::Nothing);

    // THEN: ConnectionLost, Faulted, heartbeat ends
    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within deadline")
        .expect("queue open");
    assert_eq!(event, ConnectionEvent::ConnectionLost);
    assert_eq!(manager.state().await, SessionState::Faulted);

    sleep(Duration::from_millis(50)).await;
    assert!(!heartbeat.is_running());
}

#[tokio::test]
async fn given_healthy_peer_when_heartbeat_runs_then_pings_sent_and_session_kept() {
    // GIVEN: A live session with a heartbeat
    let peer = MockPeer::acknowledging();
    let manager = Arc::new(ConnectionManager::new(
        TEST_ADDRESS,
        MockFactory::new(&peer),
        short_timeouts(),
    ));
    assert!(manager.connect(SessionToken::generate()).await);
    let heartbeat = manager.start_heartbeat(Duration::from_millis(100));

    // WHEN: Several intervals pass
    sleep(Duration::from_millis(350)).await;

    // THEN: Pings went out, still connected
    let pings = peer
        .sent_messages()
        .into_iter()
        .filter(|message| *message == Message::from(SimpleMessagePurport::Ping))
        .count();
    assert!(pings >= 2, "expected several pings, saw {pings}");
    assert!(manager.is_connected().await);
    assert!(heartbeat.is_running());

    // WHEN: Stopped
    heartbeat.stop();
    sleep(Duration::from_millis(20)).await;

    // THEN: Not running
    assert!(!heartbeat.is_running());
}

/// **VALUE**: Verifies that a zero period is raised to the minimum instead of killing
/// the heartbeat.
///
/// **WHY THIS MATTERS**: `start_heartbeat` is public and takes any `Duration`. A zero
/// period would panic inside the spawned task and the client would silently lose its
/// liveness check.
///
/// **BUG THIS CATCHES**: Would catch the period reaching `tokio::time::interval` unchecked.
#[tokio::test]
async fn given_zero_period_when_heartbeat_started_then_runs_at_minimum_period() {
    // GIVEN: A live session
    let peer = MockPeer::acknowledging();
    let manager = Arc::new(ConnectionManager::new(
        TEST_ADDRESS,
        MockFactory::new(&peer),
        short_timeouts(),
    ));
    assert!(manager.connect(SessionToken::generate()).await);

    // WHEN: Starting a heartbeat with a zero period
    let heartbeat = manager.start_heartbeat(Duration::ZERO);
    sleep(Duration::from_millis(250)).await;

    // THEN: Still running, pinging at the minimum period rather than in a tight loop
    let pings = peer
        .sent_messages()
        .into_iter()
        .filter(|message| *message == Message::from(SimpleMessagePurport::Ping))
        .count();
    assert!(heartbeat.is_running());
    assert!((1..=3).contains(&pings), "expected 1 to 3 pings, saw {pings}");
    assert!(manager.is_connected().await);
}
