use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::client::DaemonConfig;
use crate::error::AppError;
use crate::observability::correlation::RequestContext;
use crate::router::handlers::InContext;
use crate::state::AppState;
use crate::teams::Permission;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub invite_code: String,
}

#[instrument(skip_all, fields(team_id = %team_id))]
async fn _join(
    state: &AppState,
    auth: &DaemonConfig,
    team_id: &str,
    req: JoinRequest,
) -> Result<Value, AppError> {
    let invite_code = req.invite_code.trim();
    if invite_code.is_empty() {
        return Err(AppError::validation_error("inviteCode is required"));
    }

    info!("Joining federation");
    let result = state
        .client
        .join_federation(auth, invite_code)
        .await
        .into_result()?;
    info!("Joined federation");

    Ok(result)
}

#[axum_macros::debug_handler]
pub async fn handle_rest(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<JoinRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = state
        .authorized_daemon(&headers, &team_id, Permission::Manage)
        .await
        .in_context(&context)?;
    let result = _join(&state, &auth, &team_id, req)
        .await
        .in_context(&context)?;
    Ok(Json(result))
}
