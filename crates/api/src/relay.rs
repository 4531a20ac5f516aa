//! The Log Broadcast Relay.
//!
//! Holds one pattern subscription over every job's log topic and re-emits
//! each message to the gateway channel named by the topic's job id. The
//! payload is forwarded unchanged inside a `message` event.
//!
//! When the bus closes the subscription the relay subscribes again with
//! exponential backoff until it succeeds or is cancelled.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use shipyard_core::job::LOG_TOPIC_PATTERN;
use shipyard_core::JobId;
use shipyard_events::{BusError, BusMessage, BusStream, MessageBus};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::ws::{ChannelRegistry, ServerEvent};

/// Backoff between resubscription attempts.
#[derive(Debug, Clone)]
pub struct ResubscribeBackoff {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for ResubscribeBackoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl ResubscribeBackoff {
    /// Delay after `current`, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }
}

pub struct LogRelay {
    bus: Arc<dyn MessageBus>,
    registry: Arc<ChannelRegistry>,
    backoff: ResubscribeBackoff,
}

impl LogRelay {
    pub fn new(bus: Arc<dyn MessageBus>, registry: Arc<ChannelRegistry>) -> Self {
        Self {
            bus,
            registry,
            backoff: ResubscribeBackoff::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: ResubscribeBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Subscribe to `logs:*` and spawn the forwarding loop.
    ///
    /// The subscription is active when this returns. The loop runs until
    /// `cancel` fires; a closed subscription is re-established.
    pub async fn start(self, cancel: CancellationToken) -> Result<JoinHandle<()>, BusError> {
        let mut stream = self.bus.psubscribe(LOG_TOPIC_PATTERN).await?;
        tracing::info!(pattern = LOG_TOPIC_PATTERN, "Log relay subscribed");

        Ok(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::info!("Log relay stopping");
                        break;
                    }
                    next = stream.next() => match next {
                        Some(BusMessage { topic, payload, .. }) => {
                            self.on_message(&topic, payload).await;
                        }
                        None => {
                            tracing::warn!("Log relay subscription closed, resubscribing");
                            match self.resubscribe(&cancel).await {
                                Some(fresh) => stream = fresh,
                                None => {
                                    tracing::info!("Log relay stopping");
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        }))
    }

    /// Retry `psubscribe` until it succeeds. `None` once `cancel` fires.
    async fn resubscribe(&self, cancel: &CancellationToken) -> Option<BusStream> {
        let mut delay = self.backoff.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = tokio::time::sleep(delay) => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => return None,
                result = self.bus.psubscribe(LOG_TOPIC_PATTERN) => match result {
                    Ok(stream) => {
                        tracing::info!(attempt, pattern = LOG_TOPIC_PATTERN, "Log relay resubscribed");
                        return Some(stream);
                    }
                    Err(e) => {
                        tracing::warn!(attempt, error = %e, "Log relay resubscribe failed");
                    }
                }
            }

            delay = self.backoff.next_delay(delay);
        }
    }

    /// Forward one bus message to the channel derived from `topic`.
    ///
    /// Returns the number of connections it was queued for. Topics that do
    /// not name a job are dropped.
    pub async fn on_message(&self, topic: &str, payload: String) -> usize {
        let Some(job_id) = JobId::from_log_topic(topic) else {
            tracing::warn!(topic, "Dropping message on unrecognised topic");
            return 0;
        };

        let event = ServerEvent::message(job_id.channel(), payload);
        let delivered = self
            .registry
            .emit_to_channel(job_id.channel(), event.to_message())
            .await;
        tracing::trace!(job_id = %job_id, delivered, "Relayed log line");
        delivered
    }
}
