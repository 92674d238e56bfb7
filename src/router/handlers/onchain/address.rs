use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::daemon::DepositAddress;
use crate::error::AppError;
use crate::observability::correlation::RequestContext;
use crate::router::handlers::InContext;
use crate::state::AppState;
use crate::teams::Permission;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[serde(default)]
    pub federation_id: Option<String>,
}

#[axum_macros::debug_handler]
pub async fn handle_rest(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AddressRequest>,
) -> Result<Json<DepositAddress>, AppError> {
    let auth = state
        .authorized_daemon(&headers, &team_id, Permission::Transact)
        .await
        .in_context(&context)?;

    let address = state
        .client
        .onchain_address(&auth, req.federation_id.as_deref())
        .await
        .in_context(&context)?;

    info!(
        team_id = %team_id,
        federation_id = req.federation_id.as_deref().unwrap_or("default"),
        address = %address.address,
        "Generated deposit address"
    );

    Ok(Json(address))
}
