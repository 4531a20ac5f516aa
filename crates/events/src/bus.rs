//! The [`MessageBus`] capability.

use async_trait::async_trait;
use futures::stream::BoxStream;

/// A message delivered to a pattern subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Pattern the subscription was made with, e.g. `"logs:*"`.
    pub pattern: String,
    /// Concrete topic the message was published on, e.g. `"logs:abc"`.
    pub topic: String,
    /// Raw payload, untouched by the bus.
    pub payload: String,
}

/// Stream of messages for one pattern subscription.
///
/// Messages published on the same topic arrive in publish order. The stream
/// ends when the underlying transport closes.
pub type BusStream = BoxStream<'static, BusMessage>;

/// Errors raised by bus implementations.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Message bus is closed")]
    Closed,
}

/// Publish/subscribe transport with wildcard subscriptions.
///
/// Shared as `Arc<dyn MessageBus>` by the build executor (publisher) and the
/// log relay (subscriber).
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish `payload` on `topic`. Delivery is best-effort: with no
    /// matching subscribers the message is dropped.
    async fn publish(&self, topic: &str, payload: String) -> Result<(), BusError>;

    /// Subscribe to every topic matching the glob `pattern`.
    ///
    /// The subscription is active once this returns; messages published
    /// afterwards are delivered, earlier ones are not.
    async fn psubscribe(&self, pattern: &str) -> Result<BusStream, BusError>;
}
