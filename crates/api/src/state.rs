use std::sync::Arc;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::ws::ChannelRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Launches builds for `POST /project`.
    pub dispatcher: Arc<Dispatcher>,
    /// Gateway connections and their channel membership.
    pub registry: Arc<ChannelRegistry>,
}
