//! Shipyard API server library.
//!
//! Hosts three of the pipeline's components in one process:
//!
//! - the Job Dispatcher behind `POST /project` ([`dispatch`]),
//! - the Client Gateway WebSocket server ([`ws`]),
//! - the Log Broadcast Relay feeding the gateway from the bus ([`relay`]).
//!
//! Modules are public so integration tests and the binary entrypoint share
//! the same building blocks.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod relay;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
