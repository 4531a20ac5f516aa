//! The Client Gateway: WebSocket connections grouped into per-job channels.
//!
//! Provides the channel registry, the wire protocol, the heartbeat and the
//! HTTP upgrade handler mounted at `/ws`.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL};
pub use manager::ChannelRegistry;
pub use protocol::{ClientRequest, ServerEvent};
