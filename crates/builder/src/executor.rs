//! The build executor: one pass of compile, upload, announce.
//!
//! Published line sequence for a successful build:
//!
//! ```text
//! Build Started...
//! <compile output, one line each>
//! Build Complete
//! Starting to upload
//! uploading <file> / uploaded <file>   (per file)
//! Done                                 (status: done)
//! ```
//!
//! A failed compile ends with `Build Failed: ...` and a failed upload with
//! `Upload Failed: ...`, both carrying `status: failed`. Nothing is retried.

use std::path::PathBuf;
use std::sync::Arc;

use shipyard_cloud::ArtifactStore;
use shipyard_core::logs::{MSG_BUILD_COMPLETE, MSG_BUILD_STARTED, MSG_UPLOAD_STARTING};
use shipyard_core::{JobId, LogLine};
use shipyard_events::MessageBus;

use crate::artifacts::{artifact_files, ArtifactFile};
use crate::compile::CompileStep;
use crate::config::BuildSettings;
use crate::error::BuildError;
use crate::publisher::LogPublisher;

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Relative paths of the uploaded files, in upload order.
    pub uploaded: Vec<String>,
}

/// Runs the build for a single job.
pub struct BuildExecutor {
    job_id: JobId,
    compile: CompileStep,
    output_dir: PathBuf,
    store: Arc<dyn ArtifactStore>,
    publisher: LogPublisher,
}

impl BuildExecutor {
    pub fn new(
        job_id: JobId,
        settings: &BuildSettings,
        bus: Arc<dyn MessageBus>,
        store: Arc<dyn ArtifactStore>,
    ) -> Self {
        Self {
            compile: CompileStep::shell(settings.command.clone(), settings.build_dir.clone()),
            output_dir: settings.output_dir.clone(),
            publisher: LogPublisher::new(bus, job_id.clone()),
            job_id,
            store,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Run the whole pipeline. Every outcome, including failures, is also
    /// published on the job's log topic.
    pub async fn run(&self) -> Result<BuildReport, BuildError> {
        self.publisher.line(MSG_BUILD_STARTED).await;

        if let Err(e) = self.compile().await {
            self.publisher
                .publish(LogLine::failed(format!("Build Failed: {e}")))
                .await;
            return Err(e);
        }
        self.publisher.line(MSG_BUILD_COMPLETE).await;

        self.publisher.line(MSG_UPLOAD_STARTING).await;
        let uploaded = match self.upload_all().await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                self.publisher
                    .publish(LogLine::failed(format!("Upload Failed: {e}")))
                    .await;
                return Err(e);
            }
        };

        self.publisher.publish(LogLine::done()).await;
        Ok(BuildReport { uploaded })
    }

    /// Run the compile command, publishing each output line as it arrives.
    async fn compile(&self) -> Result<(), BuildError> {
        let mut running = self.compile.spawn()?;
        while let Some(line) = running.next_line().await {
            self.publisher.line(line).await;
        }

        let status = running.wait().await?;
        if status.success() {
            Ok(())
        } else {
            Err(BuildError::CompileFailed {
                exit_code: status.code().unwrap_or(-1),
            })
        }
    }

    /// Upload every output file in traversal order, stopping at the first
    /// failure.
    async fn upload_all(&self) -> Result<Vec<String>, BuildError> {
        let mut uploaded = Vec::new();
        for file in artifact_files(&self.output_dir) {
            let file = file?;
            self.upload(&file).await?;
            uploaded.push(file.relative_path);
        }
        Ok(uploaded)
    }

    /// Upload one file, bracketed by its `uploading` / `uploaded` lines.
    pub async fn upload(&self, file: &ArtifactFile) -> Result<(), BuildError> {
        self.publisher
            .line(format!("uploading {}", file.relative_path))
            .await;

        let key = self.job_id.artifact_key(&file.relative_path);
        self.store
            .put_file(&key, &file.path, &file.content_type)
            .await?;

        self.publisher
            .line(format!("uploaded {}", file.relative_path))
            .await;
        Ok(())
    }
}
