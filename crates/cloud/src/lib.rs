//! External capabilities of the deployment pipeline.
//!
//! - [`ArtifactStore`] persists build outputs ([`S3ArtifactStore`]).
//! - [`JobRunner`] launches an isolated build environment
//!   ([`EcsJobRunner`], Fargate tasks).
//!
//! [`memory`] holds in-process implementations of both for tests and local
//! runs.

pub mod aws;
pub mod ecs;
pub mod error;
pub mod memory;
pub mod runner;
pub mod s3;
pub mod store;

pub use ecs::{EcsJobRunner, EcsPlacement};
pub use error::CloudError;
pub use runner::{JobRunner, LaunchReceipt, LaunchRequest};
pub use s3::S3ArtifactStore;
pub use store::ArtifactStore;
