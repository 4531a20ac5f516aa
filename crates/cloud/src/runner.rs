//! The [`JobRunner`] capability and its launch request.

use async_trait::async_trait;
use shipyard_core::JobId;

use crate::error::CloudError;

/// Environment variable carrying the repository URL into the build
/// environment.
pub const ENV_GIT_REPOSITORY_URL: &str = "GIT_REPOSITORY__URL";

/// Environment variable carrying the job id into the build environment.
pub const ENV_PROJECT_ID: &str = "PROJECT_ID";

/// Everything a runner needs to start one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub job_id: JobId,
    pub source_url: String,
}

impl LaunchRequest {
    pub fn new(job_id: JobId, source_url: impl Into<String>) -> Self {
        Self {
            job_id,
            source_url: source_url.into(),
        }
    }

    /// Environment injected into the build executor.
    pub fn environment(&self) -> Vec<(&'static str, String)> {
        vec![
            (ENV_GIT_REPOSITORY_URL, self.source_url.clone()),
            (ENV_PROJECT_ID, self.job_id.to_string()),
        ]
    }
}

/// Returned once the runner has accepted a launch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchReceipt {
    /// Backend reference for the started environment (e.g. an ECS task ARN).
    pub task_ref: Option<String>,
}

/// Launches isolated build environments.
///
/// `launch` returns as soon as the backend has accepted the request; it never
/// waits for the build to finish.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchReceipt, CloudError>;
}
