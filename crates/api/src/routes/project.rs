use axum::routing::post;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Mount build dispatch routes.
///
/// ```text
/// POST /project    create_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/project", post(project::create_project))
}
