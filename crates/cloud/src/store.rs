use std::path::Path;

use async_trait::async_trait;

use crate::error::CloudError;

/// Object storage for build outputs.
///
/// Keys follow `__outputs/<job-id>/<relative-path>` (see
/// [`JobId::artifact_key`](shipyard_core::JobId::artifact_key)). Writing an
/// existing key overwrites it.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload the file at `path` under `key` with the given content type.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> Result<(), CloudError>;
}
