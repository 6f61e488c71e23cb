//! Periodic liveness check.

use crate::channel::ChannelFactory;
use crate::config::MIN_HEARTBEAT_MS;
use crate::connection::manager::ConnectionManager;
use crate::data::{Message, SimpleMessagePurport};

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Running heartbeat. Stops when dropped.
#[derive(Debug)]
pub struct HeartbeatHandle {
    task: JoinHandle<()>,
}

impl HeartbeatHandle {
    pub fn stop(&self) {
        self.task.abort();
    }

    /// `false` once the session was lost or ended, or after [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub(crate) fn spawn<F: ChannelFactory>(
    manager: Arc<ConnectionManager<F>>,
    period: Duration,
) -> HeartbeatHandle {
    let minimum = Duration::from_millis(MIN_HEARTBEAT_MS);
    let period = if period < minimum {
        warn!(
            "Heartbeat period {:?} for {} raised to {:?}",
            period,
            manager.address(),
            minimum
        );
        minimum
    } else {
        period
    };

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if !manager.is_connected().await {
                debug!("Heartbeat to {} stopped: not connected", manager.address());
                break;
            }

            match manager.send(Message::from(SimpleMessagePurport::Ping)).await {
                Ok(Some(response)) if response.is_acknowledged() => {}
                Ok(Some(response)) => {
                    warn!(
                        "Heartbeat to {} answered with {}",
                        manager.address(),
                        response.kind()
                    );
                    manager.mark_lost().await;
                    break;
                }
                Ok(None) => {
                    warn!("Heartbeat to {} got no response", manager.address());
                    manager.mark_lost().await;
                    break;
                }
                Err(error) => {
                    warn!("Heartbeat to {} failed: {}", manager.address(), error);
                    manager.mark_lost().await;
                    break;
                }
            }
        }
    });

    HeartbeatHandle { task }
}
