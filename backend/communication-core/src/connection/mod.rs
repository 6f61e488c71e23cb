//! Session lifecycle on top of a [`Channel`](crate::channel::Channel).

mod events;
mod heartbeat;
mod manager;
pub(crate) mod session;

pub use events::ConnectionEvent;
pub use heartbeat::HeartbeatHandle;
pub use manager::{ConnectionManager, Timeouts};
pub use session::SessionState;
