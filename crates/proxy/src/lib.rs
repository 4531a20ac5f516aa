//! Shipyard static asset reverse proxy.
//!
//! Every inbound request is mapped from its hostname to a job's artifact
//! prefix in the store and forwarded there:
//!
//! ```text
//! abc.example.com/            -> <store>/__outputs/abc/index.html
//! abc.example.com/js/app.js   -> <store>/__outputs/abc/js/app.js
//! ```
//!
//! Upstream responses (including not-found) are streamed back as-is.

pub mod config;
pub mod error;
pub mod forward;
pub mod resolve;
pub mod router;
pub mod state;

pub use error::ProxyError;
pub use resolve::resolve;
