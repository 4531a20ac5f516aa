use std::sync::Arc;

use shipyard_core::{JobId, LogLine};
use shipyard_events::MessageBus;

/// Publishes one job's log lines on its bus topic.
///
/// The executor is the only writer for the topic, so lines reach
/// subscribers in the order they are published here. Publish failures are
/// logged and otherwise ignored; log delivery is best-effort.
pub struct LogPublisher {
    bus: Arc<dyn MessageBus>,
    job_id: JobId,
    topic: String,
}

impl LogPublisher {
    pub fn new(bus: Arc<dyn MessageBus>, job_id: JobId) -> Self {
        let topic = job_id.log_topic();
        Self { bus, job_id, topic }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish a progress line.
    pub async fn line(&self, text: impl Into<String>) {
        self.publish(LogLine::text(text)).await;
    }

    pub async fn publish(&self, line: LogLine) {
        tracing::info!(job_id = %self.job_id, "{}", line.log);

        if let Err(e) = self.bus.publish(&self.topic, line.to_payload()).await {
            tracing::warn!(job_id = %self.job_id, error = %e, "Failed to publish log line");
        }
    }
}
