//! Periodic keep-alive pings for gateway sockets.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::ws::manager::ChannelRegistry;

/// Default spacing of heartbeat rounds.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ping every connected socket each `every` until `cancel` fires.
pub fn start_heartbeat(
    registry: Arc<ChannelRegistry>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(every);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticks.tick() => {
                    let sockets = registry.connection_count().await;
                    if sockets > 0 {
                        tracing::debug!(sockets, "Gateway heartbeat");
                        registry.ping_all().await;
                    }
                }
            }
        }
        tracing::debug!("Gateway heartbeat stopped");
    })
}
