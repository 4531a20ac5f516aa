pub mod health;
pub mod project;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Routes served on the dispatch API listener.
///
/// ```text
/// /health                                          service health
/// /project                                         dispatch a build (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(project::router())
}

/// Routes served on the gateway listener.
///
/// ```text
/// /health                                          service health
/// /ws                                              WebSocket
/// ```
pub fn gateway_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .route("/ws", get(ws::ws_handler))
}
