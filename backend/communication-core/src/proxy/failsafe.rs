//! Failsafe executor.
//!
//! Turns every way a request can go wrong into `CommunicationResult::failed()`:
//! transport errors, timeouts, a panicking channel, a missing response and a
//! response of the wrong kind. The fault is logged with its category and dropped.

use crate::data::{AuthenticationResponse, CommunicationResult, Response};
use crate::error::CommunicationFault;
use crate::error::ipc::IpcError;

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use log::{debug, warn};

/// The one response kind that counts as success for a request.
pub(crate) struct Expectation<T> {
    name: &'static str,
    accept: fn(Response) -> Result<T, Response>,
}

pub(crate) const ACKNOWLEDGED: Expectation<()> = Expectation {
    name: "SimpleResponse(Acknowledged)",
    accept: |response| {
        if response.is_acknowledged() {
            Ok(())
        } else {
            Err(response)
        }
    },
};

/// Any authentication response is success, whatever it carries.
pub(crate) const AUTHENTICATION: Expectation<AuthenticationResponse> = Expectation {
    name: "AuthenticationResponse",
    accept: |response| match response {
        Response::Authentication(authentication) => Ok(authentication),
        other => Err(other),
    },
};

pub(crate) async fn execute<T, Fut>(
    operation: &str,
    expectation: Expectation<T>,
    send: Fut,
) -> CommunicationResult<T>
where
    Fut: Future<Output = Result<Option<Response>, IpcError>>,
{
    let fault = match AssertUnwindSafe(send).catch_unwind().await {
        Ok(Ok(Some(response))) => match (expectation.accept)(response) {
            Ok(value) => {
                debug!("{} succeeded", operation);
                return CommunicationResult::succeeded(value);
            }
            Err(other) => CommunicationFault::protocol(format!(
                "expected {}, got {}",
                expectation.name,
                other.kind()
            )),
        },
        Ok(Ok(None)) => CommunicationFault::protocol(format!(
            "expected {}, got no response",
            expectation.name
        )),
        Ok(Err(error)) => CommunicationFault::from(error),
        Err(panic) => CommunicationFault::from(IpcError::channel_panicked(panic.as_ref())),
    };

    warn!("{} failed [{}]: {}", operation, fault.category(), fault);
    CommunicationResult::failed()
}
