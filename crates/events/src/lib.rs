//! Shipyard message bus.
//!
//! Build executors publish log lines on per-job topics; the log relay holds a
//! single pattern subscription over all of them. This crate provides:
//!
//! - [`MessageBus`]: the publish / pattern-subscribe capability.
//! - [`InMemoryBus`]: in-process implementation backed by
//!   `tokio::sync::broadcast`, used in tests and single-process setups.
//! - [`RedisBus`]: Redis pub/sub implementation used across processes.
//! - [`pattern::topic_matches`]: glob matching shared by both.

pub mod bus;
pub mod memory;
pub mod pattern;
pub mod redis_bus;

pub use bus::{BusError, BusMessage, BusStream, MessageBus};
pub use memory::InMemoryBus;
pub use redis_bus::RedisBus;
