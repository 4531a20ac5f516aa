//! Forwarding tests against a stub artifact store served on an ephemeral
//! port.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{RawQuery, Request};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use shipyard_proxy::config::ProxyConfig;
use shipyard_proxy::router::{build_proxy_router, HEALTH_PATH};
use shipyard_proxy::state::ProxyState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn index() -> impl IntoResponse {
    (
        [("content-type", "text/html"), ("x-upstream", "stub")],
        "<h1>abc</h1>",
    )
}

async fn echo(headers: HeaderMap, RawQuery(query): RawQuery) -> Json<Value> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(json!({
        "host": header("host"),
        "query": query,
        "x-custom": header("x-custom"),
        "proxy-authorization": header("proxy-authorization"),
    }))
}

async fn upload(body: String) -> String {
    format!("received {} bytes", body.len())
}

/// Four chunks, 500 ms apart.
async fn slow() -> Body {
    let chunks = futures::stream::iter(0..4).then(|i| async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok::<_, Infallible>(format!("chunk{i};"))
    });
    Body::from_stream(chunks)
}

/// Serve a stub store and return its base URL.
async fn spawn_store() -> String {
    let app = Router::new()
        .route("/__outputs/abc/index.html", get(index))
        .route("/__outputs/abc/echo", get(echo))
        .route("/__outputs/abc/upload", post(upload))
        .route("/__outputs/abc/slow", get(slow))
        .route("/__outputs/other/index.html", get(|| async { "other site" }))
        .route("/private/secret.txt", get(|| async { "secret" }))
        .fallback(|| async { (StatusCode::NOT_FOUND, "NoSuchKey") });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn proxy(base_url: &str) -> Router {
    proxy_with_timeout(base_url, 5)
}

fn proxy_with_timeout(base_url: &str, request_timeout_secs: u64) -> Router {
    let config = ProxyConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        artifact_base_url: base_url.to_string(),
        request_timeout_secs,
    };
    build_proxy_router(ProxyState::new(&config).unwrap(), &config)
}

fn get_request(host: &str, uri: &str) -> Request {
    Request::builder()
        .uri(uri)
        .header("host", host)
        .body(Body::empty())
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> (StatusCode, HeaderMap, String) {
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// Test: root path serves the job's index document
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_serves_index_document() {
    let base = spawn_store().await;

    let response = proxy(&base)
        .oneshot(get_request("abc.localhost:8000", "/"))
        .await
        .unwrap();
    let (status, headers, body) = read_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>abc</h1>");
    assert_eq!(headers["content-type"], "text/html");
    assert_eq!(headers["x-upstream"], "stub");
}

// ---------------------------------------------------------------------------
// Test: upstream not-found passes through unchanged
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_not_found_passes_through() {
    let base = spawn_store().await;

    let response = proxy(&base)
        .oneshot(get_request("other.localhost:8000", "/"))
        .await
        .unwrap();
    let (status, _, body) = read_body(response).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "NoSuchKey");
}

// ---------------------------------------------------------------------------
// Test: host rewritten, query kept, hop-by-hop headers dropped
// ---------------------------------------------------------------------------

#[tokio::test]
async fn headers_and_query_are_forwarded() {
    let base = spawn_store().await;
    let upstream_host = base.trim_start_matches("http://").to_string();

    let request = Request::builder()
        .uri("/echo?v=2&x=y")
        .header("host", "abc.example.com")
        .header("x-custom", "kept")
        .header("proxy-authorization", "Basic c2VjcmV0")
        .body(Body::empty())
        .unwrap();

    let response = proxy(&base).oneshot(request).await.unwrap();
    let (status, _, body) = read_body(response).await;
    let echoed: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(echoed["host"], upstream_host);
    assert_eq!(echoed["query"], "v=2&x=y");
    assert_eq!(echoed["x-custom"], "kept");
    assert_eq!(echoed["proxy-authorization"], Value::Null);
}

// ---------------------------------------------------------------------------
// Test: method and body are forwarded
// ---------------------------------------------------------------------------

#[tokio::test]
async fn method_and_body_are_forwarded() {
    let base = spawn_store().await;

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("host", "abc.localhost")
        .body(Body::from("hello"))
        .unwrap();

    let response = proxy(&base).oneshot(request).await.unwrap();
    let (status, _, body) = read_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "received 5 bytes");
}

// ---------------------------------------------------------------------------
// Test: a body slower than the request timeout still streams in full
// ---------------------------------------------------------------------------

#[tokio::test]
async fn long_body_outlives_request_timeout() {
    let base = spawn_store().await;

    let response = proxy_with_timeout(&base, 1)
        .oneshot(get_request("abc.localhost", "/slow"))
        .await
        .unwrap();
    let (status, _, body) = read_body(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "chunk0;chunk1;chunk2;chunk3;");
}

// ---------------------------------------------------------------------------
// Test: paths cannot escape the job's artifact prefix
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dot_segment_paths_are_rejected() {
    let base = spawn_store().await;

    for path in [
        "/../other/index.html",
        "/../../private/secret.txt",
        "/%2e%2e/%2e%2e/private/secret.txt",
    ] {
        let response = proxy(&base)
            .oneshot(get_request("abc.localhost", path))
            .await
            .unwrap();
        let (status, _, body) = read_body(response).await;
        let error: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(error["code"], "INVALID_PATH", "{path}");
    }
}

// ---------------------------------------------------------------------------
// Test: unusable hosts are rejected before forwarding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_host_is_bad_request() {
    let base = spawn_store().await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = proxy(&base).oneshot(request).await.unwrap();
    let (status, _, body) = read_body(response).await;
    let error: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "MISSING_HOST");
}

#[tokio::test]
async fn invalid_host_label_is_bad_request() {
    let base = spawn_store().await;

    let response = proxy(&base)
        .oneshot(get_request("not_a_label.example.com", "/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: an unreachable store yields 502
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unreachable_store_is_bad_gateway() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);

    let response = proxy(&format!("http://{addr}"))
        .oneshot(get_request("abc.localhost", "/"))
        .await
        .unwrap();
    let (status, _, body) = read_body(response).await;
    let error: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error["code"], "UPSTREAM_UNAVAILABLE");
}

// ---------------------------------------------------------------------------
// Test: health probe is answered locally
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_probe_is_local() {
    let response = proxy("http://127.0.0.1:9")
        .oneshot(get_request("anything", HEALTH_PATH))
        .await
        .unwrap();
    let (status, _, body) = read_body(response).await;
    let health: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
}
