#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::extract::ws::Message;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shipyard_cloud::memory::RecordingJobRunner;
use shipyard_cloud::JobRunner;
use tokio::sync::mpsc;
use tower::ServiceExt;

use shipyard_api::config::ServerConfig;
use shipyard_api::dispatch::Dispatcher;
use shipyard_api::router::{build_api_router, build_gateway_router};
use shipyard_api::state::AppState;
use shipyard_api::ws::{ChannelRegistry, ServerEvent};

pub const PROXY_DOMAIN: &str = "localhost:8000";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        api_port: 0,
        socket_port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        proxy_domain: PROXY_DOMAIN.to_string(),
    }
}

/// Application state around the given job runner and a fresh registry.
pub fn test_state(runner: Arc<dyn JobRunner>) -> AppState {
    let config = test_config();
    AppState {
        dispatcher: Arc::new(Dispatcher::new(runner, config.proxy_domain.clone())),
        config: Arc::new(config),
        registry: Arc::new(ChannelRegistry::new()),
    }
}

/// The dispatch API router backed by a recording runner.
pub fn build_test_api() -> (Router, Arc<RecordingJobRunner>) {
    let runner = Arc::new(RecordingJobRunner::new());
    let app = build_api_router(test_state(runner.clone()), &test_config());
    (app, runner)
}

/// The gateway router for `state`.
pub fn build_test_gateway(state: AppState) -> Router {
    build_gateway_router(state, &test_config())
}

/// Send a request through the router and return status plus JSON body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Build a JSON `POST` request.
pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Decode a queued gateway frame into its event.
pub fn decode(message: Message) -> ServerEvent {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("server event JSON"),
        other => panic!("expected a text frame, got {other:?}"),
    }
}

/// Drain every frame currently queued for a registry connection.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(message) = rx.try_recv() {
        events.push(decode(message));
    }
    events
}

/// The `data` of every `message` event, in order.
pub fn payloads(events: &[ServerEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ServerEvent::Message { data, .. } => Some(data.clone()),
            _ => None,
        })
        .collect()
}
