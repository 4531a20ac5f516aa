//! Job identity and the names derived from it.
//!
//! A job id is the single handle that ties together:
//!
//! - the bus topic the build executor publishes on (`logs:<id>`),
//! - the gateway channel viewers join (`<id>`),
//! - the artifact key prefix in the store (`__outputs/<id>/...`),
//! - the public hostname label (`<id>.<domain>`).
//!
//! All of these are produced here and nowhere else.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::slug;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix of every per-job log topic on the message bus.
pub const LOG_TOPIC_PREFIX: &str = "logs:";

/// Bus pattern covering every job's log topic.
pub const LOG_TOPIC_PATTERN: &str = "logs:*";

/// Top-level folder for build outputs in the artifact store.
pub const ARTIFACT_ROOT: &str = "__outputs";

/// Longest allowed id; ids double as DNS labels.
pub const MAX_JOB_ID_LEN: usize = 63;

// ---------------------------------------------------------------------------
// JobId
// ---------------------------------------------------------------------------

/// Validated job (project) identifier.
///
/// Always a valid DNS label: 1-63 characters of `[a-z0-9-]`, not starting or
/// ending with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Validate a caller-supplied id.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        validate_label(&raw)?;
        Ok(Self(raw))
    }

    /// Generate a fresh human-readable id such as `brave-quiet-harbor`.
    pub fn generate() -> Self {
        Self(slug::generate_slug())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bus topic the build executor publishes this job's log lines on.
    pub fn log_topic(&self) -> String {
        format!("{LOG_TOPIC_PREFIX}{}", self.0)
    }

    /// Gateway channel viewers join to follow this job.
    pub fn channel(&self) -> &str {
        &self.0
    }

    /// Recover the job id from a log topic produced by [`JobId::log_topic`].
    pub fn from_log_topic(topic: &str) -> Option<Self> {
        topic
            .strip_prefix(LOG_TOPIC_PREFIX)
            .and_then(|id| Self::parse(id).ok())
    }

    /// Recover the job id from a request `Host` header value.
    ///
    /// Takes the leftmost dot-delimited label after stripping any port.
    /// Hostnames are case-insensitive, so the label is lowercased first.
    pub fn from_host(host: &str) -> Option<Self> {
        let host = host.trim();
        let without_port = match host.rsplit_once(':') {
            Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
            _ => host,
        };
        let label = without_port.split('.').next()?;
        Self::parse(label.to_ascii_lowercase()).ok()
    }

    /// Key prefix under which this job's artifacts live (no trailing slash).
    pub fn artifact_prefix(&self) -> String {
        format!("{ARTIFACT_ROOT}/{}", self.0)
    }

    /// Store key for one output file. `relative_path` uses `/` separators.
    pub fn artifact_key(&self, relative_path: &str) -> String {
        format!(
            "{}/{}",
            self.artifact_prefix(),
            relative_path.trim_start_matches('/')
        )
    }

    /// Public URL of a stored artifact given the store's base URL (bucket
    /// root). `path` is the request path and keeps its leading slash.
    pub fn artifact_url(&self, store_base_url: &str, path: &str) -> String {
        let base = store_base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}/{}{path}", self.artifact_prefix())
        } else {
            format!("{base}/{}/{path}", self.artifact_prefix())
        }
    }

    /// Address the reverse proxy serves this job's site on.
    pub fn public_url(&self, proxy_domain: &str) -> String {
        format!("http://{}.{proxy_domain}", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JobId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}

/// Check that `label` is usable as a single DNS label.
fn validate_label(label: &str) -> Result<(), CoreError> {
    if label.is_empty() {
        return Err(CoreError::Validation("Job id must not be empty".into()));
    }
    if label.len() > MAX_JOB_ID_LEN {
        return Err(CoreError::Validation(format!(
            "Job id must be at most {MAX_JOB_ID_LEN} characters"
        )));
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(format!(
            "Job id '{label}' may only contain lowercase letters, digits and '-'"
        )));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(CoreError::Validation(format!(
            "Job id '{label}' must not start or end with '-'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
