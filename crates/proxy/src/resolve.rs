//! Hostname and path to artifact URL resolution.

use shipyard_core::JobId;

use crate::error::ProxyError;

/// Document served for the site root.
pub const INDEX_DOCUMENT: &str = "/index.html";

/// Resolve a request to the artifact URL it should be forwarded to.
///
/// `host` is the request's `Host` value (a port is ignored) and
/// `path_and_query` the request target. The project id is the host's
/// leftmost label; an empty path or `/` is served as `/index.html`; the
/// query string is carried over. Paths with dot segments or encoded
/// separators are rejected so a host never reaches another job's prefix.
pub fn resolve(base_url: &str, host: &str, path_and_query: &str) -> Result<String, ProxyError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ProxyError::MissingHost);
    }
    let job_id = JobId::from_host(host).ok_or_else(|| ProxyError::InvalidHost(host.to_string()))?;

    let (path, query) = match path_and_query.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path_and_query, None),
    };
    let path = match path {
        "" | "/" => INDEX_DOCUMENT,
        other => other,
    };
    if !is_contained(path) {
        return Err(ProxyError::InvalidPath(path.to_string()));
    }

    let mut url = job_id.artifact_url(base_url, path);
    if let Some(query) = query {
        url.push('?');
        url.push_str(query);
    }
    Ok(url)
}

/// True when no segment of `path` can be normalised into a parent or
/// sibling directory by a URL parser or the store.
fn is_contained(path: &str) -> bool {
    let lowered = path.to_ascii_lowercase();
    if lowered.contains('\\') || lowered.contains("%2f") || lowered.contains("%5c") {
        return false;
    }
    lowered
        .split('/')
        .map(|segment| segment.replace("%2e", "."))
        .all(|segment| segment != "." && segment != "..")
}
