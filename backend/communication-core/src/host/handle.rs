//! Communication host handle type.

use std::net::SocketAddr;

use tokio::task::JoinHandle;

/// Handle to a running communication host.
///
/// Returned by [`start_communication_host`](crate::host::start_communication_host).
/// The host stops, and drops every open connection, on [`shutdown`](Self::shutdown)
/// or when the handle is dropped.
#[derive(Debug)]
pub struct CommunicationHostHandle {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

impl CommunicationHostHandle {
    pub(crate) fn new(local_addr: SocketAddr, task: JoinHandle<()>) -> Self {
        Self { local_addr, task }
    }

    /// Bound socket address; the real port when the config asked for port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `ws://` address a proxy connects to.
    pub fn address(&self) -> String {
        format!("ws://{}", self.local_addr)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for CommunicationHostHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
