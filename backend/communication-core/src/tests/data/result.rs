use crate::data::{AuthenticationResponse, CommunicationResult};

/// **VALUE**: Verifies that a failed result carries no value.
///
/// **WHY THIS MATTERS**: Callers are told never to read the value of a failed result.
/// If a failure could carry a stale value, code that ignores that rule would act on it.
///
/// **BUG THIS CATCHES**: Would catch `failed()` or `Default` accidentally filling in a
/// default payload.
#[test]
fn given_failed_result_when_read_then_no_value() {
    // GIVEN: A failed and a defaulted result
    let failed: CommunicationResult<AuthenticationResponse> = CommunicationResult::failed();
    let defaulted: CommunicationResult<AuthenticationResponse> = CommunicationResult::default();

    // THEN: Both are unsuccessful and empty
    assert!(!failed.success());
    assert!(failed.value().is_none());
    assert_eq!(failed, defaulted);
    assert_eq!(
        defaulted.into_value().unwrap_or_default(),
        AuthenticationResponse::default()
    );
}

#[test]
fn given_succeeded_result_when_read_then_value_present() {
    // GIVEN: A successful result
    let result = CommunicationResult::succeeded(AuthenticationResponse { process_id: 42 });

    // THEN: Success with the value
    assert!(result.success());
    assert_eq!(result.value().map(|r| r.process_id), Some(42));
}
