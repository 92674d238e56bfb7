use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::error::AppError;
use crate::federations::{self, DaemonOverview};
use crate::observability::correlation::RequestContext;
use crate::router::handlers::InContext;
use crate::state::AppState;
use crate::teams::Permission;

#[axum_macros::debug_handler]
pub async fn handle_rest(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DaemonOverview>, AppError> {
    let auth = state
        .authorized_daemon(&headers, &team_id, Permission::View)
        .await
        .in_context(&context)?;

    let overview = federations::daemon_overview(&state.client, &auth)
        .await
        .in_context(&context)?;
    Ok(Json(overview))
}
