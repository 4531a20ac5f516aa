//! In-process message bus backed by a `tokio::sync::broadcast` channel.
//!
//! Every subscription receives every published message and filters it
//! against its own pattern, mirroring how a broker does pattern delivery.

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::bus::{BusError, BusMessage, BusStream, MessageBus};
use crate::pattern::topic_matches;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// A message as it travels through the broadcast channel.
#[derive(Debug, Clone)]
struct Published {
    topic: String,
    payload: String,
}

/// In-process fan-out bus.
///
/// When the buffer is full the oldest unconsumed messages are dropped for
/// slow subscribers, which log the gap and keep going.
pub struct InMemoryBus {
    sender: broadcast::Sender<Published>,
}

impl InMemoryBus {
    /// Create a bus with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), BusError> {
        // A SendError only means there are zero subscribers.
        let _ = self.sender.send(Published {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }

    async fn psubscribe(&self, pattern: &str) -> Result<BusStream, BusError> {
        let pattern = pattern.to_string();
        let receiver = self.sender.subscribe();

        let stream = BroadcastStream::new(receiver).filter_map(move |item| {
            let pattern = pattern.clone();
            async move {
                match item {
                    Ok(msg) if topic_matches(&pattern, &msg.topic) => Some(BusMessage {
                        pattern,
                        topic: msg.topic,
                        payload: msg.payload,
                    }),
                    Ok(_) => None,
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, pattern = %pattern, "Bus subscription lagged");
                        None
                    }
                }
            }
        });

        Ok(stream.boxed())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
