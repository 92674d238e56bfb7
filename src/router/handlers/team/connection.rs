use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::{info, warn};

use crate::error::AppError;
use crate::federations;
use crate::observability::correlation::RequestContext;
use crate::router::handlers::InContext;
use crate::state::AppState;
use crate::teams::{ConnectionStatus, Permission};

/// Check the team's daemon and keep the result as its connection status
#[axum_macros::debug_handler]
pub async fn handle_rest(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ConnectionStatus>, AppError> {
    let auth = state
        .authorized_daemon(&headers, &team_id, Permission::Manage)
        .await
        .in_context(&context)?;

    let status = federations::test_connection(&state.client, &auth).await;
    if status.connected {
        info!(
            team_id = %team_id,
            federation_count = status.federation_count,
            "Daemon connection test succeeded"
        );
    } else {
        warn!(
            team_id = %team_id,
            error = status.error.as_deref().unwrap_or_default(),
            "Daemon connection test failed"
        );
    }

    state
        .record_status(&team_id, status.clone())
        .await
        .in_context(&context)?;
    Ok(Json(status))
}
