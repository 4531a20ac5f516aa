use shipyard_core::config::{self, ConfigError};

/// Reverse proxy configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Artifact store root, e.g. `https://bucket.s3.region.amazonaws.com`.
    /// Job prefixes (`__outputs/<id>`) are appended per request.
    pub artifact_base_url: String,
    /// Upstream request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ProxyConfig {
    /// | Env Var                | Required | Default   |
    /// |------------------------|----------|-----------|
    /// | `ARTIFACT_BASE_URL`    | yes      | --        |
    /// | `HOST`                 | no       | `0.0.0.0` |
    /// | `REVERSE_PROXY_PORT`   | no       | `8000`    |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: config::optional("HOST", "0.0.0.0"),
            port: config::parse_or("REVERSE_PROXY_PORT", 8000)?,
            artifact_base_url: config::require("ARTIFACT_BASE_URL")?,
            request_timeout_secs: config::parse_or("REQUEST_TIMEOUT_SECS", 30)?,
        })
    }
}
