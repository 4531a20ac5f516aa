//! Dispatch, build and relay wired together in one process.
//!
//! The dispatch request goes through the real router with a recording job
//! runner; the "launched" build is then run in-process with the dispatched
//! id, publishing on the same in-memory bus the relay listens to.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shipyard_api::relay::LogRelay;
use shipyard_api::router::build_api_router;
use shipyard_api::ws::ServerEvent;
use shipyard_builder::config::BuildSettings;
use shipyard_builder::BuildExecutor;
use shipyard_cloud::memory::{MemoryArtifactStore, RecordingJobRunner};
use shipyard_core::{BuildStatus, JobId, LogLine};
use shipyard_events::InMemoryBus;
use tokio_util::sync::CancellationToken;

use common::{decode, post_json, send, test_config, test_state};

#[tokio::test]
async fn dispatched_build_streams_to_joined_viewer() {
    let bus = Arc::new(InMemoryBus::default());
    let store = Arc::new(MemoryArtifactStore::new());
    let runner = Arc::new(RecordingJobRunner::new());
    let state = test_state(runner.clone());
    let registry = Arc::clone(&state.registry);

    let cancel = CancellationToken::new();
    let relay = LogRelay::new(bus.clone(), Arc::clone(&registry))
        .start(cancel.clone())
        .await
        .unwrap();

    // --- Dispatch ---
    let app = build_api_router(state, &test_config());
    let (_, body) = send(
        app,
        post_json("/project", json!({"gitURL": "https://example.com/repo.git"})),
    )
    .await;
    let slug = body["data"]["projectSlug"].as_str().unwrap().to_string();
    let launch = runner.launches().await.remove(0);
    assert_eq!(launch.job_id.as_str(), slug);

    // --- Viewer joins before the build starts ---
    let mut viewer = registry.add("viewer".to_string()).await;
    registry.join("viewer", &slug).await;

    // --- Build ---
    let dir = tempfile::tempdir().unwrap();
    let command = "echo compiling; mkdir -p dist/static; \
                   echo '<h1>ok</h1>' > dist/index.html; \
                   echo 'x' > dist/static/app.js";
    let settings = BuildSettings::new(dir.path(), "dist", command);
    let job_id = JobId::parse(slug.clone()).unwrap();
    BuildExecutor::new(job_id, &settings, bus.clone(), store.clone())
        .run()
        .await
        .unwrap();

    // --- Viewer sees the whole stream, in order ---
    let mut lines = Vec::new();
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), viewer.recv())
            .await
            .expect("viewer timed out")
            .expect("viewer channel closed");
        let ServerEvent::Message { channel, data } = decode(message) else {
            panic!("expected a relayed message");
        };
        assert_eq!(channel, slug);
        let line = LogLine::from_payload(&data).unwrap();
        let terminal = line.is_terminal();
        lines.push(line);
        if terminal {
            break;
        }
    }

    let texts: Vec<&str> = lines.iter().map(|l| l.log.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Build Started...",
            "compiling",
            "Build Complete",
            "Starting to upload",
            "uploading index.html",
            "uploaded index.html",
            "uploading static/app.js",
            "uploaded static/app.js",
            "Done",
        ]
    );
    assert_eq!(lines.last().unwrap().status, Some(BuildStatus::Done));
    assert_eq!(
        store.keys().await,
        vec![
            format!("__outputs/{slug}/index.html"),
            format!("__outputs/{slug}/static/app.js"),
        ]
    );

    cancel.cancel();
    relay.await.unwrap();
}
