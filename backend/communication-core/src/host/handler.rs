use crate::data::{Message, Response};

use std::future::Future;

/// Application side of a communication host.
///
/// The host answers handshakes, pings and disconnections itself and only passes
/// typed messages from the authorized session to the handler. Returning `None`
/// sends the peer an envelope without payload, which its proxy counts as failure.
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, message: Message) -> impl Future<Output = Option<Response>> + Send;
}
