//! The Job Dispatcher.
//!
//! Turns a build request into exactly one Job Runner launch and returns the
//! job's tracking handle as soon as the launch is accepted. No state is kept
//! between calls; two concurrent requests for the same slug both launch.

use std::sync::Arc;

use shipyard_cloud::{CloudError, JobRunner, LaunchRequest};
use shipyard_core::error::CoreError;
use shipyard_core::JobId;

/// Why a dispatch was refused.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The request itself is unusable (blank source URL, invalid slug).
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The Job Runner did not start the build environment.
    #[error(transparent)]
    Launch(#[from] CloudError),
}

/// Handle returned to the caller once a build is queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub job_id: JobId,
    /// Public URL the deployment will be served from.
    pub url: String,
    /// Backend reference of the launched environment, when the runner
    /// reports one.
    pub task_ref: Option<String>,
}

pub struct Dispatcher {
    runner: Arc<dyn JobRunner>,
    proxy_domain: String,
}

impl Dispatcher {
    pub fn new(runner: Arc<dyn JobRunner>, proxy_domain: impl Into<String>) -> Self {
        Self {
            runner,
            proxy_domain: proxy_domain.into(),
        }
    }

    /// Launch a build of `source_url`.
    ///
    /// A blank or absent `slug` gets a generated id; a supplied one must be
    /// a valid DNS label and is used as-is.
    pub async fn dispatch(
        &self,
        source_url: &str,
        slug: Option<&str>,
    ) -> Result<DispatchReceipt, DispatchError> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(CoreError::Validation("gitURL is required".to_string()).into());
        }

        let job_id = match slug.map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => JobId::parse(slug)?,
            None => JobId::generate(),
        };

        let request = LaunchRequest::new(job_id.clone(), source_url);
        let receipt = self.runner.launch(&request).await.inspect_err(|e| {
            tracing::warn!(job_id = %job_id, error = %e, "Build launch failed");
        })?;

        tracing::info!(
            job_id = %job_id,
            task_ref = receipt.task_ref.as_deref().unwrap_or("-"),
            source_url,
            "Build queued",
        );

        Ok(DispatchReceipt {
            url: job_id.public_url(&self.proxy_domain),
            job_id,
            task_ref: receipt.task_ref,
        })
    }
}
