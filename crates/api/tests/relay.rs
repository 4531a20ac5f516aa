//! Log relay tests over the in-memory bus: channel isolation, ordering and
//! shutdown.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use shipyard_api::relay::{LogRelay, ResubscribeBackoff};
use shipyard_api::ws::ChannelRegistry;
use shipyard_core::{JobId, LogLine};
use shipyard_events::{BusError, BusStream, InMemoryBus, MessageBus};
use tokio_util::sync::CancellationToken;

use common::{drain, payloads};

/// Publish `text` as a log line for `job`.
async fn publish(bus: &InMemoryBus, job: &str, text: &str) -> String {
    let payload = LogLine::text(text).to_payload();
    bus.publish(&JobId::parse(job).unwrap().log_topic(), payload.clone())
        .await
        .unwrap();
    payload
}

/// In-memory bus whose first subscription closes after `first_limit`
/// messages, the way a dropped Redis connection ends its stream.
struct ClosingBus {
    inner: InMemoryBus,
    first_limit: usize,
    subscriptions: AtomicUsize,
}

impl ClosingBus {
    fn new(first_limit: usize) -> Self {
        Self {
            inner: InMemoryBus::default(),
            first_limit,
            subscriptions: AtomicUsize::new(0),
        }
    }

    fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageBus for ClosingBus {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), BusError> {
        self.inner.publish(topic, payload).await
    }

    async fn psubscribe(&self, pattern: &str) -> Result<BusStream, BusError> {
        let stream = self.inner.psubscribe(pattern).await?;
        if self.subscriptions.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(stream.take(self.first_limit).boxed())
        } else {
            Ok(stream)
        }
    }
}

fn fast_backoff() -> ResubscribeBackoff {
    ResubscribeBackoff {
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        multiplier: 2.0,
    }
}

/// Give the relay task a chance to forward everything already published.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

// ---------------------------------------------------------------------------
// Test: on_message routes by topic without a running loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn on_message_routes_to_topic_channel() {
    let registry = Arc::new(ChannelRegistry::new());
    let mut rx = registry.add("viewer".to_string()).await;
    registry.join("viewer", "abc").await;
    let relay = LogRelay::new(Arc::new(InMemoryBus::default()), Arc::clone(&registry));

    assert_eq!(relay.on_message("logs:abc", "p1".to_string()).await, 1);
    assert_eq!(relay.on_message("logs:other", "p2".to_string()).await, 0);

    assert_eq!(payloads(&drain(&mut rx)), vec!["p1"]);
}

#[tokio::test]
async fn unparsable_topics_are_dropped() {
    let registry = Arc::new(ChannelRegistry::new());
    let mut rx = registry.add("viewer".to_string()).await;
    registry.join("viewer", "abc").await;
    let relay = LogRelay::new(Arc::new(InMemoryBus::default()), Arc::clone(&registry));

    assert_eq!(relay.on_message("abc", "p".to_string()).await, 0);
    assert_eq!(relay.on_message("logs:", "p".to_string()).await, 0);
    assert_eq!(relay.on_message("logs:Not Valid", "p".to_string()).await, 0);
    assert!(drain(&mut rx).is_empty());
}

// ---------------------------------------------------------------------------
// Test: two jobs, two viewers, no cross-talk
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_jobs_are_isolated() {
    let bus = Arc::new(InMemoryBus::default());
    let registry = Arc::new(ChannelRegistry::new());
    let mut viewer_a = registry.add("viewer-a".to_string()).await;
    let mut viewer_b = registry.add("viewer-b".to_string()).await;
    registry.join("viewer-a", "job-a").await;
    registry.join("viewer-b", "job-b").await;

    let cancel = CancellationToken::new();
    let handle = LogRelay::new(bus.clone(), Arc::clone(&registry))
        .start(cancel.clone())
        .await
        .unwrap();

    let a1 = publish(&bus, "job-a", "a1").await;
    let b1 = publish(&bus, "job-b", "b1").await;
    let a2 = publish(&bus, "job-a", "a2").await;
    let b2 = publish(&bus, "job-b", "b2").await;
    settle().await;

    assert_eq!(payloads(&drain(&mut viewer_a)), vec![a1, a2]);
    assert_eq!(payloads(&drain(&mut viewer_b)), vec![b1, b2]);

    cancel.cancel();
    handle.await.unwrap();
}

// ---------------------------------------------------------------------------
// Test: lines arrive in publish order, payload untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lines_arrive_in_publish_order() {
    let bus = Arc::new(InMemoryBus::default());
    let registry = Arc::new(ChannelRegistry::new());
    let mut viewer = registry.add("viewer".to_string()).await;
    registry.join("viewer", "job-j").await;

    let cancel = CancellationToken::new();
    let handle = LogRelay::new(bus.clone(), Arc::clone(&registry))
        .start(cancel.clone())
        .await
        .unwrap();

    let mut expected = Vec::new();
    for i in 1..=50 {
        expected.push(publish(&bus, "job-j", &format!("L{i}")).await);
    }
    settle().await;

    assert_eq!(payloads(&drain(&mut viewer)), expected);

    cancel.cancel();
    handle.await.unwrap();
}

// ---------------------------------------------------------------------------
// Test: a viewer in both channels sees both streams; late joiners see none
// ---------------------------------------------------------------------------

#[tokio::test]
async fn late_joiner_misses_earlier_lines() {
    let bus = Arc::new(InMemoryBus::default());
    let registry = Arc::new(ChannelRegistry::new());
    let mut early = registry.add("early".to_string()).await;
    let mut late = registry.add("late".to_string()).await;
    registry.join("early", "job-j").await;

    let cancel = CancellationToken::new();
    let handle = LogRelay::new(bus.clone(), Arc::clone(&registry))
        .start(cancel.clone())
        .await
        .unwrap();

    let first = publish(&bus, "job-j", "first").await;
    settle().await;
    registry.join("late", "job-j").await;
    let second = publish(&bus, "job-j", "second").await;
    settle().await;

    assert_eq!(payloads(&drain(&mut early)), vec![first, second.clone()]);
    assert_eq!(payloads(&drain(&mut late)), vec![second]);

    cancel.cancel();
    handle.await.unwrap();
}

// ---------------------------------------------------------------------------
// Test: cancellation stops the relay and drops the subscription
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_stops_relay() {
    let bus = Arc::new(InMemoryBus::default());
    let registry = Arc::new(ChannelRegistry::new());

    let cancel = CancellationToken::new();
    let handle = LogRelay::new(bus.clone(), registry)
        .start(cancel.clone())
        .await
        .unwrap();
    assert_eq!(bus.subscriber_count(), 1);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("relay should stop")
        .unwrap();

    assert_eq!(bus.subscriber_count(), 0);
}

// ---------------------------------------------------------------------------
// Test: a closed subscription is re-established
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_subscription_is_resubscribed() {
    let bus = Arc::new(ClosingBus::new(1));
    let registry = Arc::new(ChannelRegistry::new());
    let mut viewer = registry.add("viewer".to_string()).await;
    registry.join("viewer", "job-r").await;

    let cancel = CancellationToken::new();
    let handle = LogRelay::new(bus.clone(), Arc::clone(&registry))
        .with_backoff(fast_backoff())
        .start(cancel.clone())
        .await
        .unwrap();

    let topic = JobId::parse("job-r").unwrap().log_topic();
    let before = LogLine::text("before").to_payload();
    bus.publish(&topic, before.clone()).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        while bus.subscriptions() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("relay should subscribe again");

    let after = LogLine::text("after").to_payload();
    bus.publish(&topic, after.clone()).await.unwrap();
    settle().await;

    assert_eq!(payloads(&drain(&mut viewer)), vec![before, after]);
    assert!(!handle.is_finished());

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn cancel_interrupts_resubscribe_backoff() {
    let bus = Arc::new(ClosingBus::new(0));
    let registry = Arc::new(ChannelRegistry::new());

    let cancel = CancellationToken::new();
    let handle = LogRelay::new(bus.clone(), registry)
        .with_backoff(ResubscribeBackoff {
            initial_delay: Duration::from_secs(60),
            ..ResubscribeBackoff::default()
        })
        .start(cancel.clone())
        .await
        .unwrap();
    settle().await;

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("relay should stop while backing off")
        .unwrap();
    assert_eq!(bus.subscriptions(), 1);
}
