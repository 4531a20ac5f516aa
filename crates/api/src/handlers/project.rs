//! Handler for build dispatch.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::StatusResponse;
use crate::state::AppState;

/// Request body for `POST /project`.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    /// Repository to build. A missing field is reported as a validation
    /// error rather than a deserialization error.
    #[serde(rename = "gitURL", default)]
    pub git_url: String,
    /// Optional caller-chosen job id.
    #[serde(default)]
    pub slug: Option<String>,
}

/// Tracking handle returned once the build is queued.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedProject {
    pub project_slug: String,
    pub url: String,
}

/// POST /project
///
/// Launch a build and return `{ "status": "queued", "data": { projectSlug, url } }`.
pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<impl IntoResponse> {
    let receipt = state
        .dispatcher
        .dispatch(&input.git_url, input.slug.as_deref())
        .await?;

    Ok(Json(StatusResponse {
        status: "queued",
        data: QueuedProject {
            project_slug: receipt.job_id.to_string(),
            url: receipt.url,
        },
    }))
}
