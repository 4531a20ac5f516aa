//! `shipyard-builder` library crate.
//!
//! The build executor that runs inside each launched build environment:
//! compile the checked-out project, stream its output to the job's log
//! topic, then upload the produced files to the artifact store.
//!
//! The binary entrypoint lives in `main.rs`; modules are public so
//! integration tests can drive the executor with in-memory capabilities.

pub mod artifacts;
pub mod compile;
pub mod config;
pub mod error;
pub mod executor;
pub mod publisher;

pub use error::BuildError;
pub use executor::{BuildExecutor, BuildReport};
