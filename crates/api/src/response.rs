//! Response envelope types for API handlers.

use serde::Serialize;

/// `{ "status": ..., "data": T }` envelope used by the dispatch endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse<T: Serialize> {
    pub status: &'static str,
    pub data: T,
}
