//! The forwarding handler.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::response::Response;

use crate::error::ProxyError;
use crate::resolve::resolve;
use crate::state::ProxyState;

/// Largest request body forwarded upstream.
const MAX_REQUEST_BODY: usize = 10 * 1024 * 1024;

/// Connection-scoped headers that are never forwarded, in either direction.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Fallback handler: forward any request to its deployment's artifacts.
pub async fn proxy_handler(
    State(state): State<ProxyState>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let host = request_host(&parts.headers, &parts.uri).ok_or(ProxyError::MissingHost)?;
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    let target = resolve(&state.artifact_base_url, &host, path_and_query)?;

    let body = axum::body::to_bytes(body, MAX_REQUEST_BODY)
        .await
        .map_err(|e| ProxyError::RequestBody(e.to_string()))?;

    tracing::debug!(host = %host, method = %parts.method, target = %target, "Forwarding");

    let upstream = state
        .client
        .request(parts.method, &target)
        .headers(forwardable(&parts.headers, true))
        .body(body)
        .send()
        .await?;

    let mut response = Response::builder().status(upstream.status());
    if let Some(headers) = response.headers_mut() {
        headers.extend(forwardable(upstream.headers(), false));
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ProxyError::Internal(e.to_string()))
}

/// Host the client addressed: the `Host` header, or the URI authority for
/// absolute-form and HTTP/2 requests.
fn request_host(headers: &HeaderMap, uri: &axum::http::Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
        .filter(|h| !h.trim().is_empty())
}

/// Copy `headers` minus hop-by-hop ones. On the request side `Host` is
/// dropped too so the client sets the upstream's own.
pub fn forwardable(headers: &HeaderMap, request_side: bool) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if HOP_BY_HOP.contains(name) || (request_side && name == header::HOST) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}
