use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use shipyard_builder::config::BuildSettings;
use shipyard_builder::BuildExecutor;
use shipyard_cloud::memory::MemoryArtifactStore;
use shipyard_core::{JobId, LogLine};
use shipyard_events::{BusStream, InMemoryBus, MessageBus};

/// An executor wired to in-memory capabilities, plus a subscription on the
/// job's log topic opened before anything is published.
pub struct Harness {
    pub executor: BuildExecutor,
    pub store: Arc<MemoryArtifactStore>,
    pub logs: BusStream,
}

/// Build a harness that runs `command` in `build_dir` and uploads `dist/`.
pub async fn harness(job: &str, build_dir: &Path, command: &str) -> Harness {
    let bus = Arc::new(InMemoryBus::default());
    let store = Arc::new(MemoryArtifactStore::new());
    let job_id = JobId::parse(job).unwrap();

    let logs = bus.psubscribe(&job_id.log_topic()).await.unwrap();
    let settings = BuildSettings::new(build_dir, "dist", command);
    let executor = BuildExecutor::new(job_id, &settings, bus, store.clone());

    Harness {
        executor,
        store,
        logs,
    }
}

/// Drain published lines up to and including the terminal one.
pub async fn collect_until_terminal(logs: &mut BusStream) -> Vec<LogLine> {
    let mut lines = Vec::new();
    while let Some(msg) = logs.next().await {
        let line = LogLine::from_payload(&msg.payload).expect("payload should be a log line");
        let terminal = line.is_terminal();
        lines.push(line);
        if terminal {
            break;
        }
    }
    lines
}

/// Just the text of each line.
pub fn texts(lines: &[LogLine]) -> Vec<&str> {
    lines.iter().map(|l| l.log.as_str()).collect()
}
