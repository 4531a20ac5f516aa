//! In-process stand-ins for the external capabilities.
//!
//! [`MemoryArtifactStore`] keeps uploaded files in memory and
//! [`RecordingJobRunner`] records launches instead of starting anything.
//! Both can be told to fail so error paths are reachable in tests.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::CloudError;
use crate::runner::{JobRunner, LaunchReceipt, LaunchRequest};
use crate::store::ArtifactStore;

// ---------------------------------------------------------------------------
// MemoryArtifactStore
// ---------------------------------------------------------------------------

/// An object captured by [`MemoryArtifactStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Artifact store that keeps objects in upload order.
#[derive(Default)]
pub struct MemoryArtifactStore {
    objects: Mutex<Vec<StoredObject>>,
    failing_key: Mutex<Option<String>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload of `key` fail.
    pub async fn fail_on(&self, key: impl Into<String>) {
        *self.failing_key.lock().await = Some(key.into());
    }

    /// Snapshot of all stored objects, in upload order.
    pub async fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().await.clone()
    }

    /// Keys of all stored objects, in upload order.
    pub async fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .await
            .iter()
            .map(|o| o.key.clone())
            .collect()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<(), CloudError> {
        if self.failing_key.lock().await.as_deref() == Some(key) {
            return Err(CloudError::Upload {
                key: key.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let body = tokio::fs::read(path).await.map_err(|e| CloudError::Upload {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        let mut objects = self.objects.lock().await;
        // Same overwrite semantics as a real bucket.
        objects.retain(|o| o.key != key);
        objects.push(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingJobRunner
// ---------------------------------------------------------------------------

/// Job runner that records each accepted launch.
#[derive(Default)]
pub struct RecordingJobRunner {
    launches: Mutex<Vec<LaunchRequest>>,
    rejection: Option<String>,
}

impl RecordingJobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner that rejects every launch with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            launches: Mutex::new(Vec::new()),
            rejection: Some(reason.into()),
        }
    }

    /// Accepted launches, in order.
    pub async fn launches(&self) -> Vec<LaunchRequest> {
        self.launches.lock().await.clone()
    }
}

#[async_trait]
impl JobRunner for RecordingJobRunner {
    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchReceipt, CloudError> {
        if let Some(reason) = &self.rejection {
            return Err(CloudError::LaunchRejected(reason.clone()));
        }

        let mut launches = self.launches.lock().await;
        launches.push(request.clone());
        Ok(LaunchReceipt {
            task_ref: Some(format!("local-task-{}", launches.len())),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
