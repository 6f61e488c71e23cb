use crate::data::SessionToken;
use crate::host::connection_state::{ConnectionState, SessionSlot};

/// **VALUE**: Verifies that only one session exists across connections.
///
/// **WHY THIS MATTERS**: The service trusts the single client that completed the
/// handshake. A second local process must not get a parallel session.
///
/// **BUG THIS CATCHES**: Would catch the slot being per-connection instead of shared.
#[test]
fn given_active_session_when_second_connection_opens_then_refused() {
    // GIVEN: Two connections sharing a slot, the first with a session
    let slot = SessionSlot::default();
    let mut first = ConnectionState::new(None, slot.clone());
    let mut second = ConnectionState::new(None, slot.clone());
    let issued = first.open_session(SessionToken::generate());
    assert!(issued.is_some());

    // WHEN: The second connection handshakes
    let refused = second.open_session(SessionToken::generate());

    // THEN: Refused
    assert!(refused.is_none());
}

/// **VALUE**: Verifies that the slot frees up when the owning connection goes away.
///
/// **BUG THIS CATCHES**: Would catch a crashed client locking everyone out until the
/// service restarts.
#[test]
fn given_session_owner_dropped_when_new_connection_opens_then_accepted() {
    // GIVEN: A session whose connection is dropped
    let slot = SessionSlot::default();
    let mut first = ConnectionState::new(None, slot.clone());
    first.open_session(SessionToken::generate());
    drop(first);

    // WHEN: A new connection handshakes
    let mut second = ConnectionState::new(None, slot);

    // THEN: Accepted
    assert!(second.open_session(SessionToken::generate()).is_some());
}

#[test]
fn given_startup_token_when_wrong_token_offered_then_refused() {
    // GIVEN: A host expecting a specific startup token
    let expected = SessionToken::generate();
    let mut state = ConnectionState::new(Some(expected), SessionSlot::default());

    // WHEN/THEN: Wrong token refused, right token accepted
    assert!(state.open_session(SessionToken::generate()).is_none());
    assert!(state.open_session(expected).is_some());
}

/// **VALUE**: Verifies that the issued token, not the offered one, authorizes frames.
///
/// **BUG THIS CATCHES**: Would catch the host issuing a fresh token but then checking
/// frames against the startup token.
#[test]
fn given_open_session_when_checking_tokens_then_only_issued_token_authorized() {
    // GIVEN: A session opened with a startup token
    let startup = SessionToken::generate();
    let mut state = ConnectionState::new(Some(startup), SessionSlot::default());
    let issued = state.open_session(startup).expect("accepted");

    // THEN: Only the issued token passes
    assert_ne!(issued, startup);
    assert!(state.is_authorized(&issued.to_string()));
    assert!(!state.is_authorized(&startup.to_string()));
    assert!(!state.is_authorized(""));

    // WHEN: The session closes
    state.close_session();

    // THEN: Nothing is authorized
    assert!(!state.is_authorized(&issued.to_string()));
}
