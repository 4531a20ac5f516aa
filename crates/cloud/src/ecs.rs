//! [`JobRunner`] backed by ECS Fargate tasks.
//!
//! Each launch runs one task of the configured task definition, placed in
//! the configured subnets and security groups with a public IP, and
//! overrides the builder container's environment with the job's values.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use shipyard_core::config::{self, ConfigError};

use crate::error::CloudError;
use crate::runner::{JobRunner, LaunchReceipt, LaunchRequest};

/// Default name of the container inside the task definition that runs the
/// build executor.
pub const DEFAULT_BUILDER_CONTAINER: &str = "builder-image";

/// Where and how build tasks are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcsPlacement {
    pub cluster: String,
    pub task_definition: String,
    pub container_name: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
}

impl EcsPlacement {
    /// | Env Var             | Required | Default         |
    /// |---------------------|----------|-----------------|
    /// | `CLUSTER`           | yes      | --              |
    /// | `TASK`              | yes      | --              |
    /// | `BUILDER_CONTAINER` | no       | `builder-image` |
    /// | `SUBNETS`           | yes      | --              |
    /// | `SECURITY_GROUPS`   | yes      | --              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cluster: config::require("CLUSTER")?,
            task_definition: config::require("TASK")?,
            container_name: config::optional("BUILDER_CONTAINER", DEFAULT_BUILDER_CONTAINER),
            subnets: config::require_list("SUBNETS")?,
            security_groups: config::require_list("SECURITY_GROUPS")?,
        })
    }
}

/// Launches build executors as Fargate tasks.
pub struct EcsJobRunner {
    client: aws_sdk_ecs::Client,
    placement: EcsPlacement,
}

impl EcsJobRunner {
    pub fn new(sdk_config: &SdkConfig, placement: EcsPlacement) -> Self {
        Self {
            client: aws_sdk_ecs::Client::new(sdk_config),
            placement,
        }
    }
}

#[async_trait]
impl JobRunner for EcsJobRunner {
    async fn launch(&self, request: &LaunchRequest) -> Result<LaunchReceipt, CloudError> {
        let output = self
            .client
            .run_task()
            .cluster(&self.placement.cluster)
            .task_definition(&self.placement.task_definition)
            .launch_type(LaunchType::Fargate)
            .count(1)
            .network_configuration(network_configuration(&self.placement)?)
            .overrides(task_overrides(&self.placement.container_name, request))
            .send()
            .await
            .map_err(|e| CloudError::LaunchRejected(DisplayErrorContext(&e).to_string()))?;

        // ECS accepts the call but reports capacity or placement problems as
        // per-task failures.
        if output.tasks().is_empty() {
            let reason = output
                .failures()
                .first()
                .map(|f| {
                    format!(
                        "{}: {}",
                        f.arn().unwrap_or("task"),
                        f.reason().unwrap_or("unknown reason")
                    )
                })
                .unwrap_or_else(|| "no task was started".to_string());
            return Err(CloudError::LaunchRejected(reason));
        }

        let task_ref = output
            .tasks()
            .first()
            .and_then(|t| t.task_arn())
            .map(str::to_string);

        tracing::debug!(
            job_id = %request.job_id,
            task_arn = task_ref.as_deref().unwrap_or("-"),
            "ECS task started"
        );

        Ok(LaunchReceipt { task_ref })
    }
}

/// VPC placement with a public IP so the builder can reach the repository
/// host, the bus and the store.
fn network_configuration(placement: &EcsPlacement) -> Result<NetworkConfiguration, CloudError> {
    let vpc = AwsVpcConfiguration::builder()
        .set_subnets(Some(placement.subnets.clone()))
        .set_security_groups(Some(placement.security_groups.clone()))
        .assign_public_ip(AssignPublicIp::Enabled)
        .build()
        .map_err(|e| CloudError::InvalidRequest(e.to_string()))?;

    Ok(NetworkConfiguration::builder()
        .awsvpc_configuration(vpc)
        .build())
}

/// Container environment override carrying the job's values.
fn task_overrides(container_name: &str, request: &LaunchRequest) -> TaskOverride {
    let environment = request
        .environment()
        .into_iter()
        .map(|(name, value)| KeyValuePair::builder().name(name).value(value).build())
        .collect();

    TaskOverride::builder()
        .container_overrides(
            ContainerOverride::builder()
                .name(container_name)
                .set_environment(Some(environment))
                .build(),
        )
        .build()
}
