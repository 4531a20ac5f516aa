use shipyard_cloud::aws::AwsSettings;
use shipyard_cloud::EcsPlacement;
use shipyard_core::config::{self, ConfigError};

/// HTTP-facing settings shared by the API and gateway listeners.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Port of the dispatch API (default: `9000`).
    pub api_port: u16,
    /// Port of the WebSocket gateway (default: `9002`).
    pub socket_port: u16,
    /// Allowed CORS origins; `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Domain the reverse proxy serves deployments under, used to build
    /// the public URL returned by the dispatcher.
    pub proxy_domain: String,
}

impl ServerConfig {
    /// | Env Var                | Default          |
    /// |------------------------|------------------|
    /// | `HOST`                 | `0.0.0.0`        |
    /// | `API_SERVER_PORT`      | `9000`           |
    /// | `SOCKET_PORT`          | `9002`           |
    /// | `CORS_ORIGINS`         | `*`              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`             |
    /// | `PROXY_DOMAIN`         | `localhost:8000` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: config::optional("HOST", "0.0.0.0"),
            api_port: config::parse_or("API_SERVER_PORT", 9000)?,
            socket_port: config::parse_or("SOCKET_PORT", 9002)?,
            cors_origins: config::split_list(&config::optional("CORS_ORIGINS", "*")),
            request_timeout_secs: config::parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            proxy_domain: config::optional("PROXY_DOMAIN", "localhost:8000"),
        })
    }
}

/// Everything the `shipyard-api` binary needs at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub server: ServerConfig,
    /// Message bus connection string (`REDIS_URL`, required).
    pub redis_url: String,
    pub aws: AwsSettings,
    pub placement: EcsPlacement,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            redis_url: config::require("REDIS_URL")?,
            aws: AwsSettings::from_env()?,
            placement: EcsPlacement::from_env()?,
        })
    }
}
