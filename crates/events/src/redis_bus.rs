//! Redis pub/sub implementation of [`MessageBus`].
//!
//! Publishing goes through one shared multiplexed connection. Each pattern
//! subscription opens its own dedicated pub/sub connection, since Redis
//! connections in subscriber mode cannot issue other commands.

use async_trait::async_trait;
use futures::StreamExt;
use redis::AsyncCommands;

use crate::bus::{BusError, BusMessage, BusStream, MessageBus};

/// Message bus backed by a Redis server.
pub struct RedisBus {
    client: redis::Client,
    publisher: redis::aio::MultiplexedConnection,
}

impl RedisBus {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = redis::Client::open(url)?;
        let publisher = client.get_multiplexed_async_connection().await?;
        tracing::info!("Connected to Redis message bus");
        Ok(Self { client, publisher })
    }
}

#[async_trait]
impl MessageBus for RedisBus {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), BusError> {
        let mut conn = self.publisher.clone();
        let receivers: i64 = conn.publish(topic, payload).await?;
        tracing::trace!(topic, receivers, "Published bus message");
        Ok(())
    }

    async fn psubscribe(&self, pattern: &str) -> Result<BusStream, BusError> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.psubscribe(pattern).await?;
        tracing::info!(pattern, "Subscribed to Redis pattern");

        let fallback_pattern = pattern.to_string();
        let stream = pubsub.into_on_message().filter_map(move |msg| {
            let fallback_pattern = fallback_pattern.clone();
            async move {
                let payload: String = match msg.get_payload() {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!(
                            topic = msg.get_channel_name(),
                            error = %e,
                            "Dropping bus message with non-text payload"
                        );
                        return None;
                    }
                };
                let pattern = msg.get_pattern::<String>().unwrap_or(fallback_pattern);
                Some(BusMessage {
                    pattern,
                    topic: msg.get_channel_name().to_string(),
                    payload,
                })
            }
        });

        Ok(stream.boxed())
    }
}
