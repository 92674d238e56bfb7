use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use tracing::{info, instrument};

use crate::client::api::InvoiceRequest;
use crate::client::DaemonConfig;
use crate::daemon::CreatedInvoice;
use crate::error::AppError;
use crate::observability::correlation::RequestContext;
use crate::observability::sanitize_invoice;
use crate::router::handlers::InContext;
use crate::state::AppState;
use crate::teams::Permission;

#[instrument(
    skip_all,
    fields(
        federation_id = %req.federation_id,
        gateway_id = %req.gateway_id,
        amount_msat = req.amount_msat,
        expiry_time = req.expiry_time,
    )
)]
async fn _invoice(
    state: &AppState,
    auth: &DaemonConfig,
    req: InvoiceRequest,
) -> Result<CreatedInvoice, AppError> {
    if req.amount_msat == 0 {
        return Err(AppError::validation_error("amountMsat must be positive"));
    }
    if req.federation_id.is_empty() || req.gateway_id.is_empty() {
        return Err(AppError::validation_error(
            "federationId and gatewayId are required",
        ));
    }

    let created = state.client.create_invoice(auth, &req).await.into_result()?;

    info!(
        invoice = %sanitize_invoice(&created.invoice),
        operation_id = created.operation_id.as_deref().unwrap_or_default(),
        "Invoice created"
    );

    Ok(created)
}

#[axum_macros::debug_handler]
pub async fn handle_rest(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<InvoiceRequest>,
) -> Result<Json<CreatedInvoice>, AppError> {
    let auth = state
        .authorized_daemon(&headers, &team_id, Permission::Transact)
        .await
        .in_context(&context)?;
    let created = _invoice(&state, &auth, req).await.in_context(&context)?;
    Ok(Json(created))
}
