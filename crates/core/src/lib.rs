//! Shared domain primitives for the Shipyard deployment pipeline.
//!
//! Every component (dispatcher, build executor, log relay, reverse proxy)
//! derives topic names, channel names and artifact paths from [`JobId`], so
//! a job's logs and files always line up across process boundaries.

pub mod config;
pub mod error;
pub mod job;
pub mod logs;
pub mod slug;
pub mod types;

pub use job::JobId;
pub use logs::{BuildStatus, LogLine};
