//! Wire format for build log lines.
//!
//! The build executor publishes one JSON object per line on the job's log
//! topic. The relay and gateway never decode it; they forward the payload
//! string as-is.

use serde::{Deserialize, Serialize};

/// First line of every build.
pub const MSG_BUILD_STARTED: &str = "Build Started...";

/// Published after the compile step exits successfully.
pub const MSG_BUILD_COMPLETE: &str = "Build Complete";

/// Published right before the upload loop starts.
pub const MSG_UPLOAD_STARTING: &str = "Starting to upload";

/// Terminal line of a successful build.
pub const MSG_DONE: &str = "Done";

/// Terminal outcome carried on the last line of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Done,
    Failed,
}

/// One published log line: `{"log": "...", "status"?: "done" | "failed"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub log: String,

    /// Set only on the terminal line so consumers can tell success from
    /// failure without matching on text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BuildStatus>,
}

impl LogLine {
    /// A progress line.
    pub fn text(log: impl Into<String>) -> Self {
        Self {
            log: log.into(),
            status: None,
        }
    }

    /// The terminal line for a successful build.
    pub fn done() -> Self {
        Self {
            log: MSG_DONE.to_string(),
            status: Some(BuildStatus::Done),
        }
    }

    /// A terminal failure line.
    pub fn failed(log: impl Into<String>) -> Self {
        Self {
            log: log.into(),
            status: Some(BuildStatus::Failed),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_some()
    }

    /// Encode for publishing on the bus.
    pub fn to_payload(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decode a payload received from the bus.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
