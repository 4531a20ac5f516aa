use shipyard_cloud::CloudError;

/// Why a build did not reach `Done`.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The compile command could not be started at all.
    #[error("could not start build command: {0}")]
    Spawn(#[source] std::io::Error),

    /// The compile command ran and exited unsuccessfully (`-1` when killed
    /// by a signal).
    #[error("exit code {exit_code}")]
    CompileFailed { exit_code: i32 },

    /// The output directory could not be traversed.
    #[error("could not read build output: {0}")]
    Walk(#[from] walkdir::Error),

    /// An artifact upload failed; remaining uploads were skipped.
    #[error(transparent)]
    Upload(#[from] CloudError),
}
