use std::path::PathBuf;

use shipyard_cloud::aws::AwsSettings;
use shipyard_cloud::runner::{ENV_GIT_REPOSITORY_URL, ENV_PROJECT_ID};
use shipyard_core::config::{self, ConfigError};
use shipyard_core::JobId;

/// Default location of the checked-out project inside the build image.
pub const DEFAULT_BUILD_DIR: &str = "/home/app/output";

/// Default build output folder, relative to the project directory.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Default dependency-install-and-compile command.
pub const DEFAULT_BUILD_COMMAND: &str = "npm install && npm run build";

/// What to run and where to find its output.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Project working tree; the compile command runs here.
    pub build_dir: PathBuf,
    /// Directory whose files are uploaded after a successful compile.
    pub output_dir: PathBuf,
    /// Shell command run through `sh -c`.
    pub command: String,
}

impl BuildSettings {
    /// `output_dir` is resolved against `build_dir` unless absolute.
    pub fn new(
        build_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        command: impl Into<String>,
    ) -> Self {
        let build_dir = build_dir.into();
        let output_dir = build_dir.join(output_dir.into());
        Self {
            build_dir,
            output_dir,
            command: command.into(),
        }
    }
}

/// Build executor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub job_id: JobId,
    /// Repository the working tree was checked out from (informational).
    pub source_url: Option<String>,
    pub redis_url: String,
    pub bucket: String,
    pub aws: AwsSettings,
    pub build: BuildSettings,
}

impl BuilderConfig {
    /// | Env Var               | Required | Default                        |
    /// |-----------------------|----------|--------------------------------|
    /// | `PROJECT_ID`          | yes      | --                             |
    /// | `GIT_REPOSITORY__URL` | no       | --                             |
    /// | `REDIS_URL`           | yes      | --                             |
    /// | `BUCKET`              | yes      | --                             |
    /// | `REGION`, `ACCESS_KEY_ID`, `SECRET_ACCESS_KEY` | yes | --          |
    /// | `BUILD_DIR`           | no       | `/home/app/output`             |
    /// | `BUILD_OUTPUT_DIR`    | no       | `dist`                         |
    /// | `BUILD_COMMAND`       | no       | `npm install && npm run build` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let job_id = JobId::parse(config::require(ENV_PROJECT_ID)?).map_err(|e| {
            ConfigError::Invalid {
                name: ENV_PROJECT_ID,
                reason: e.to_string(),
            }
        })?;

        let source_url = std::env::var(ENV_GIT_REPOSITORY_URL)
            .ok()
            .filter(|s| !s.trim().is_empty());

        let build = BuildSettings::new(
            config::optional("BUILD_DIR", DEFAULT_BUILD_DIR),
            config::optional("BUILD_OUTPUT_DIR", DEFAULT_OUTPUT_DIR),
            config::optional("BUILD_COMMAND", DEFAULT_BUILD_COMMAND),
        );

        Ok(Self {
            job_id,
            source_url,
            redis_url: config::require("REDIS_URL")?,
            bucket: config::require("BUCKET")?,
            aws: AwsSettings::from_env()?,
            build,
        })
    }
}
