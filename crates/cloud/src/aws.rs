//! Shared AWS SDK configuration.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use shipyard_core::config::{self, ConfigError};

/// Provider name reported by the static credentials.
const CREDENTIALS_PROVIDER: &str = "shipyard-env";

/// Region and static credentials read from the environment.
#[derive(Clone)]
pub struct AwsSettings {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AwsSettings {
    /// | Env Var             | Required |
    /// |---------------------|----------|
    /// | `REGION`            | yes      |
    /// | `ACCESS_KEY_ID`     | yes      |
    /// | `SECRET_ACCESS_KEY` | yes      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            region: config::require("REGION")?,
            access_key_id: config::require("ACCESS_KEY_ID")?,
            secret_access_key: config::require("SECRET_ACCESS_KEY")?,
        })
    }
}

impl std::fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSettings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Build an SDK config using the static credentials in `settings`.
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let credentials = Credentials::new(
        settings.access_key_id.clone(),
        settings.secret_access_key.clone(),
        None,
        None,
        CREDENTIALS_PROVIDER,
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .load()
        .await
}
