use std::sync::Arc;
use std::time::Duration;

use crate::config::ProxyConfig;
use crate::error::ProxyError;

/// Shared state for the proxy handler.
#[derive(Clone)]
pub struct ProxyState {
    /// Upstream client. Redirects are passed back to the browser rather
    /// than followed. There is no overall deadline, only connect and
    /// per-read ones, so long bodies keep streaming.
    pub client: reqwest::Client,
    /// Artifact store root URL.
    pub artifact_base_url: Arc<str>,
}

impl ProxyState {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.request_timeout_secs))
            .read_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProxyError::Internal(format!("could not build HTTP client: {e}")))?;

        Ok(Self {
            client,
            artifact_base_url: Arc::from(config.artifact_base_url.as_str()),
        })
    }
}
