/// Failures reported by external capabilities.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The job runner refused to start the build environment (quota, bad
    /// image, network config, ...).
    #[error("Launch rejected: {0}")]
    LaunchRejected(String),

    /// The launch request could not be assembled from configuration.
    #[error("Invalid launch request: {0}")]
    InvalidRequest(String),

    /// Storing an artifact failed.
    #[error("Upload of {key} failed: {reason}")]
    Upload { key: String, reason: String },
}
