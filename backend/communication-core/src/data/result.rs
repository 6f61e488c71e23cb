/// Outcome of a proxy operation.
///
/// Never an error type: a failed send, a missing response and a response of the wrong
/// kind all produce the same `success == false` with no value. Callers treat any
/// failure generically ("service unavailable") and only read the value on success.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct CommunicationResult<T = ()> {
    success: bool,
    value: Option<T>,
}

impl<T> CommunicationResult<T> {
    pub fn succeeded(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            value: None,
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// The response payload; `None` whenever the operation failed.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T> Default for CommunicationResult<T> {
    fn default() -> Self {
        Self::failed()
    }
}
